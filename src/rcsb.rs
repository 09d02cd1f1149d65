use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use reqwest::Url;
use tracing::debug;

use crate::error::GtopError;
use crate::gtop::parse_base_url;
use crate::retry::RetryPolicy;
use crate::transport::{HttpReply, Transport};

pub const RCSB_BASE_URL: &str = "https://www.rcsb.org/pdb/rest/";

pub const SMILES_QUERY: &str = "smilesQuery";
pub const DESCRIPTOR_QUERY: &str = "ChemCompDescriptorQuery";
pub const NAME_QUERY: &str = "ChemCompNameQuery";
pub const SEQUENCE_QUERY: &str = "SequenceQuery";
pub const CHEM_COMP_ID_QUERY: &str = "ChemCompIdQuery";
pub const UNIPROT_ACCESSION_QUERY: &str = "UpAccessionIdQuery";

const ADVANCED_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const QUERY_TYPE_PREFIX: &str = "org.pdb.query.simple.";

/// One element of a simple-search result document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    pub text: String,
}

impl XmlElement {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn first_child(&self) -> Option<&XmlElement> {
        self.children.first()
    }
}

/// Parsed body of a simple (GET) search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDocument {
    root: XmlElement,
}

impl SearchDocument {
    pub fn parse(xml: &str) -> Result<Self, GtopError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;
        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => stack.push(element_from(e)?),
                Ok(Event::Empty(ref e)) => {
                    let element = element_from(e)?;
                    attach(&mut stack, &mut root, element);
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| GtopError::Payload("unbalanced XML".to_string()))?;
                    attach(&mut stack, &mut root, element);
                }
                Ok(Event::Text(ref e)) => {
                    let text = e
                        .unescape()
                        .map_err(|err| GtopError::Payload(err.to_string()))?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(err) => return Err(GtopError::Payload(err.to_string())),
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(GtopError::Payload("unclosed XML element".to_string()));
        }
        root.map(|root| Self { root })
            .ok_or_else(|| GtopError::Payload("XML document has no root".to_string()))
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }
}

fn element_from(start: &BytesStart<'_>) -> Result<XmlElement, GtopError> {
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| GtopError::Payload(err.to_string()))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|err| GtopError::Payload(err.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(XmlElement {
        name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        attributes,
        children: Vec::new(),
        text: String::new(),
    })
}

fn attach(stack: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Builds the advanced-search request body.
pub fn advanced_query_xml(kind: &str, criteria: &[(&str, &str)]) -> String {
    let elements = criteria
        .iter()
        .map(|(key, value)| format!("<{key}>{}</{key}>", escape(*value)))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "<orgPdbQuery>\n<queryType>{QUERY_TYPE_PREFIX}{kind}</queryType>\n{elements}\n</orgPdbQuery>"
    )
}

/// Interprets an advanced-search body. The service signals "no results" with
/// text containing `null` or `problem`.
pub fn parse_advanced_reply(body: &str) -> Option<Vec<String>> {
    let lowered = body.to_lowercase();
    if lowered.contains("null") || lowered.contains("problem") {
        return None;
    }
    Some(body.split_whitespace().map(|token| token.to_string()).collect())
}

pub trait StructureSearch {
    /// GET query; `None` unless the service answers with an XML document.
    fn simple_search(&self, kind: &str, criteria: &[(&str, &str)]) -> Option<SearchDocument>;

    /// POST query; the raw whitespace-separated tokens, or `None` when the
    /// service reports no results. Tokens may carry a `:suffix`.
    fn advanced_search(&self, kind: &str, criteria: &[(&str, &str)]) -> Option<Vec<String>>;
}

impl<S: StructureSearch + ?Sized> StructureSearch for &S {
    fn simple_search(&self, kind: &str, criteria: &[(&str, &str)]) -> Option<SearchDocument> {
        (**self).simple_search(kind, criteria)
    }

    fn advanced_search(&self, kind: &str, criteria: &[(&str, &str)]) -> Option<Vec<String>> {
        (**self).advanced_search(kind, criteria)
    }
}

pub struct RcsbSearchClient<T: Transport> {
    transport: T,
    base_url: Url,
    retry: RetryPolicy,
}

impl<T: Transport> RcsbSearchClient<T> {
    pub fn new(transport: T, base_url: &str, retry: RetryPolicy) -> Result<Self, GtopError> {
        Ok(Self {
            transport,
            base_url: parse_base_url(base_url)?,
            retry,
        })
    }

    pub fn simple_url(&self, kind: &str, criteria: &[(&str, &str)]) -> Option<Url> {
        let mut url = self.base_url.join(kind).ok()?;
        if !criteria.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in criteria {
                pairs.append_pair(key, value);
            }
        }
        Some(url)
    }

    fn send_with_retries<F>(&self, url: &str, make_req: F) -> Option<HttpReply>
    where
        F: Fn() -> Result<HttpReply, GtopError>,
    {
        self.retry.run(url, || {
            let reply = make_req()?;
            if reply.is_success() {
                Ok(reply)
            } else {
                Err(GtopError::Status {
                    status: reply.status,
                    message: "RCSB request failed".to_string(),
                })
            }
        })
    }
}

impl<T: Transport> StructureSearch for RcsbSearchClient<T> {
    fn simple_search(&self, kind: &str, criteria: &[(&str, &str)]) -> Option<SearchDocument> {
        let url = self.simple_url(kind, criteria)?;
        let reply = self.send_with_retries(url.as_str(), || self.transport.get(url.as_str()))?;
        let is_xml = reply
            .content_type
            .as_deref()
            .map(|value| value.to_lowercase().contains("xml"))
            .unwrap_or(false);
        if !is_xml {
            debug!(kind, content_type = ?reply.content_type, "simple search returned non-XML");
            return None;
        }
        match SearchDocument::parse(&reply.body) {
            Ok(document) => Some(document),
            Err(err) => {
                debug!(kind, error = %err, "simple search returned malformed XML");
                None
            }
        }
    }

    fn advanced_search(&self, kind: &str, criteria: &[(&str, &str)]) -> Option<Vec<String>> {
        let url = self.base_url.join("search").ok()?;
        let body = advanced_query_xml(kind, criteria);
        let reply = self.send_with_retries(url.as_str(), || {
            self.transport.post(url.as_str(), &body, ADVANCED_CONTENT_TYPE)
        })?;
        let tokens = parse_advanced_reply(&reply.body);
        if tokens.is_none() {
            debug!(kind, "advanced search reported no results");
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMILES_RESULT: &str = r#"<?xml version='1.0' standalone='no' ?>
<smilesQueryResult smiles="NC(=O)C1=CC=CC=C1" search_type="4">
<ligandInfo>
<ligand structureId="2XG3" chemicalID="UNU" type="non-polymer" molecularWeight="121.137">
  <chemicalName>BENZAMIDE</chemicalName>
</ligand>
<ligand structureId="3A1I" chemicalID="UNU" type="non-polymer" molecularWeight="121.137">
  <chemicalName>BENZAMIDE</chemicalName>
</ligand>
</ligandInfo>
</smilesQueryResult>"#;

    #[test]
    fn parses_simple_search_document() {
        let document = SearchDocument::parse(SMILES_RESULT).unwrap();
        assert_eq!(document.root().name, "smilesQueryResult");
        let info = document.root().first_child().unwrap();
        let ids: Vec<_> = info
            .children
            .iter()
            .filter_map(|child| child.attribute("structureId"))
            .collect();
        assert_eq!(ids, vec!["2XG3", "3A1I"]);
        assert_eq!(info.children[0].children[0].text, "BENZAMIDE");
    }

    #[test]
    fn rejects_broken_xml() {
        assert!(SearchDocument::parse("<a><b></a>").is_err());
        assert!(SearchDocument::parse("").is_err());
    }

    #[test]
    fn advanced_body_embeds_kind_and_criteria() {
        let body = advanced_query_xml(NAME_QUERY, &[("comparator", "Equals"), ("name", "A&B")]);
        assert!(body.starts_with("<orgPdbQuery>"));
        assert!(body.contains("<queryType>org.pdb.query.simple.ChemCompNameQuery</queryType>"));
        assert!(body.contains("<comparator>Equals</comparator>"));
        assert!(body.contains("<name>A&amp;B</name>"));
    }

    #[test]
    fn advanced_reply_sentinels() {
        assert_eq!(parse_advanced_reply("null"), None);
        assert_eq!(parse_advanced_reply("There was a Problem"), None);
        assert_eq!(
            parse_advanced_reply("1LS6:1 1Z28:1\n2D06:1\n"),
            Some(vec!["1LS6:1".to_string(), "1Z28:1".to_string(), "2D06:1".to_string()])
        );
        assert_eq!(parse_advanced_reply(""), Some(Vec::new()));
    }
}

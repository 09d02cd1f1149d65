#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use gtop_xref::domain::Attempts;
use gtop_xref::error::GtopError;
use gtop_xref::gtop::GtopClient;
use gtop_xref::rcsb::{SearchDocument, StructureSearch, parse_advanced_reply};
use gtop_xref::repository::GtopRepository;
use gtop_xref::resolver::PdbResolver;
use gtop_xref::retry::RetryPolicy;
use gtop_xref::transport::{HttpReply, Transport};

pub const BASE: &str = "http://gtop.test/services/";

/// GtoP stand-in answering from a table of query paths.
#[derive(Default)]
pub struct FakeGtop {
    routes: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl FakeGtop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, query: &str, json: Value) -> Self {
        self.routes.insert(format!("{BASE}{query}"), json.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, query: &str) -> usize {
        let url = format!("{BASE}{query}");
        self.calls().iter().filter(|call| **call == url).count()
    }
}

impl Transport for FakeGtop {
    fn get(&self, url: &str) -> Result<HttpReply, GtopError> {
        self.calls.lock().unwrap().push(url.to_string());
        Ok(match self.routes.get(url) {
            Some(body) => HttpReply {
                status: 200,
                content_type: Some("application/json".to_string()),
                body: body.clone(),
            },
            None => HttpReply {
                status: 404,
                content_type: None,
                body: String::new(),
            },
        })
    }

    fn post(&self, url: &str, _body: &str, _content_type: &str) -> Result<HttpReply, GtopError> {
        Err(GtopError::Http(format!("unexpected POST to {url}")))
    }
}

/// Structure search answering from scripted replies keyed by query kind.
#[derive(Default)]
pub struct FakeSearch {
    advanced: HashMap<String, String>,
    simple: HashMap<String, String>,
    calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl FakeSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the raw reply body; bodies mentioning `null` mean no results.
    pub fn advanced(mut self, kind: &str, body: &str) -> Self {
        self.advanced.insert(kind.to_string(), body.to_string());
        self
    }

    pub fn simple(mut self, kind: &str, xml: &str) -> Self {
        self.simple.insert(kind.to_string(), xml.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_of(&self, kind: &str) -> Vec<Vec<(String, String)>> {
        self.calls()
            .into_iter()
            .filter(|(called, _)| called == kind)
            .map(|(_, criteria)| criteria)
            .collect()
    }

    fn record(&self, kind: &str, criteria: &[(&str, &str)]) {
        self.calls.lock().unwrap().push((
            kind.to_string(),
            criteria
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        ));
    }
}

impl StructureSearch for FakeSearch {
    fn simple_search(&self, kind: &str, criteria: &[(&str, &str)]) -> Option<SearchDocument> {
        self.record(kind, criteria);
        let xml = self.simple.get(kind)?;
        SearchDocument::parse(xml).ok()
    }

    fn advanced_search(&self, kind: &str, criteria: &[(&str, &str)]) -> Option<Vec<String>> {
        self.record(kind, criteria);
        let body = self.advanced.get(kind)?;
        parse_advanced_reply(body)
    }
}

pub fn retry(attempts: i64) -> RetryPolicy {
    RetryPolicy::immediate(Attempts::new(attempts).unwrap())
}

pub fn repository(gtop: &FakeGtop) -> GtopRepository<&FakeGtop> {
    GtopRepository::new(GtopClient::new(gtop, BASE, retry(1)).unwrap())
}

pub fn resolver<'a>(
    gtop: &'a FakeGtop,
    search: &'a FakeSearch,
) -> PdbResolver<&'a FakeGtop, &'a FakeSearch> {
    PdbResolver::new(repository(gtop), search)
}

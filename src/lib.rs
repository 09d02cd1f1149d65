pub mod config;
pub mod domain;
pub mod entities;
pub mod error;
pub mod gtop;
pub mod output;
pub mod rcsb;
pub mod repository;
pub mod resolver;
pub mod retry;
pub mod transport;

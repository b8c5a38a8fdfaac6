// src/sources/mercado_publico.rs
//! Mercado Público open-data feed: one ZIP per month, each containing
//! `;`-separated CSVs in ISO-8859-1 with one row per rubro association.

use std::io::{Cursor, Read};

use async_trait::async_trait;
use tracing::{info, warn};

use super::{tender_from_row, TenderSource};
use crate::error::SourceError;
use crate::tender::Tender;

const SOURCE_NAME: &str = "mercado_publico";

pub struct MercadoPublicoSource {
    client: reqwest::Client,
    base_url: String,
    year: i32,
    month: u32,
}

impl MercadoPublicoSource {
    pub fn new(base_url: impl Into<String>, year: i32, month: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            year,
            month,
        }
    }

    fn url(&self) -> String {
        format!("{}{}-{:02}.zip", self.base_url, self.year, self.month)
    }

    async fn download(&self) -> Result<Vec<u8>, SourceError> {
        let url = self.url();
        info!(%url, "downloading monthly feed");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::new(SOURCE_NAME, format!("GET {url}: {e}")))?
            .error_for_status()
            .map_err(|e| SourceError::new(SOURCE_NAME, format!("GET {url}: {e}")))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::new(SOURCE_NAME, format!("body of {url}: {e}")))?;
        Ok(bytes.to_vec())
    }
}

/// The feed predates UTF-8: bytes are ISO-8859-1, where every byte maps
/// 1:1 to the Unicode code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Parse one CSV member. Malformed rows are skipped with a warning;
/// missing columns come through as empty fields.
pub(crate) fn parse_csv(text: &str) -> Vec<Tender> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_reader(text.as_bytes());

    let header: Vec<String> = match reader.headers() {
        Ok(h) => h.iter().map(|s| s.to_string()).collect(),
        Err(e) => {
            warn!(error = %e, "csv member has no readable header; skipping file");
            return Vec::new();
        }
    };

    let mut tenders = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        match record {
            Ok(rec) => {
                let row: Vec<String> = rec.iter().map(|s| s.to_string()).collect();
                tenders.push(tender_from_row(&header, &row));
            }
            Err(_) => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(skipped, "malformed csv rows skipped");
    }
    tenders
}

fn parse_zip(bytes: &[u8]) -> Result<Vec<Tender>, SourceError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| SourceError::new(SOURCE_NAME, format!("opening zip: {e}")))?;

    let mut tenders = Vec::new();
    let mut csv_members = 0usize;
    for i in 0..archive.len() {
        let mut member = archive
            .by_index(i)
            .map_err(|e| SourceError::new(SOURCE_NAME, format!("zip member {i}: {e}")))?;
        if !member.name().to_ascii_lowercase().ends_with(".csv") {
            continue;
        }
        csv_members += 1;
        let name = member.name().to_string();
        let mut raw = Vec::new();
        if let Err(e) = member.read_to_end(&mut raw) {
            warn!(member = %name, error = %e, "unreadable csv member; skipping");
            continue;
        }
        let mut parsed = parse_csv(&decode_latin1(&raw));
        info!(member = %name, rows = parsed.len(), "csv member parsed");
        tenders.append(&mut parsed);
    }

    if csv_members == 0 {
        return Err(SourceError::new(SOURCE_NAME, "zip contains no csv members"));
    }
    Ok(tenders)
}

#[async_trait]
impl TenderSource for MercadoPublicoSource {
    async fn fetch(&self) -> Result<Vec<Tender>, SourceError> {
        let bytes = self.download().await?;
        parse_zip(&bytes)
    }

    fn name(&self) -> &'static str {
        SOURCE_NAME
    }
}

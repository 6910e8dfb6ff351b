//! Upstream risk index sources: EFFIS (global) and Met Office FSI (UK).
//!
//! Each adapter performs one fetch-and-parse against its upstream and hands
//! back a `RawIndexReading`. Transport and payload failures come back as
//! `FetchFailure` so the resilient fetcher can classify them; the adapters
//! themselves never retry and never fall back.

use super::types::{RawIndexReading, RiskLevel};
use crate::fetch::{classify_transport, FetchFailure};
use crate::geo::GeoCoordinate;
use std::time::Duration;

const USER_AGENT: &str = "Wildguard/0.4 (wildfire-risk-engine)";

/// A ranked upstream that can be queried for a risk reading at a point.
///
/// `Send` so the orchestrator can sit behind the server's shared state.
pub trait RiskSource: Send {
    fn name(&self) -> &'static str;

    /// One query attempt, bounded by `timeout` at the transport layer.
    fn query(
        &self,
        coord: &GeoCoordinate,
        timeout: Duration,
    ) -> Result<RawIndexReading, FetchFailure>;
}

// ─── EFFIS / GWIS Fire Weather Index (primary, global) ──────────

const EFFIS_URL: &str = "https://maps.effis.emergency.copernicus.eu/effis";

pub struct EffisSource;

impl RiskSource for EffisSource {
    fn name(&self) -> &'static str {
        "effis"
    }

    fn query(
        &self,
        coord: &GeoCoordinate,
        timeout: Duration,
    ) -> Result<RawIndexReading, FetchFailure> {
        // Point query via WMS GetFeatureInfo on a one-pixel cell.
        let d = 0.05;
        let url = format!(
            "{}?service=WMS&version=1.3.0&request=GetFeatureInfo\
             &layers=ecmwf.fwi&query_layers=ecmwf.fwi\
             &info_format=application/json&crs=EPSG:4326\
             &width=1&height=1&i=0&j=0&bbox={},{},{},{}",
            EFFIS_URL,
            coord.latitude - d,
            coord.longitude - d,
            coord.latitude + d,
            coord.longitude + d,
        );

        tracing::debug!(coord = %coord.redacted(), source = self.name(), "querying fire weather index");

        let response = ureq::get(&url)
            .set("User-Agent", USER_AGENT)
            .timeout(timeout)
            .call()
            .map_err(classify_transport)?;

        let body: serde_json::Value = response
            .into_json()
            .map_err(|e| FetchFailure::Parse(e.to_string()))?;

        parse_effis_body(&body)
    }
}

/// Pull the FWI value out of a GetFeatureInfo response.
fn parse_effis_body(body: &serde_json::Value) -> Result<RawIndexReading, FetchFailure> {
    let fwi = body
        .get("features")
        .and_then(|f| f.as_array())
        .and_then(|f| f.first())
        .and_then(|f| f.get("properties"))
        .and_then(|p| p.get("fwi"))
        .and_then(|v| v.as_f64())
        .ok_or_else(|| FetchFailure::Parse("no fwi value in response".into()))?;

    if !fwi.is_finite() || fwi < 0.0 {
        return Err(FetchFailure::Parse(format!("fwi value {} out of range", fwi)));
    }

    Ok(RawIndexReading {
        level: RiskLevel::from_index(fwi),
        index: Some(fwi),
    })
}

// ─── Met Office Fire Severity Index (secondary, England/UK) ─────

const FSI_URL: &str =
    "https://environment.data.gov.uk/arcgis/rest/services/EA/FireSeverityIndex/FeatureServer/0/query";

pub struct MetOfficeFsiSource;

impl RiskSource for MetOfficeFsiSource {
    fn name(&self) -> &'static str {
        "metoffice-fsi"
    }

    fn query(
        &self,
        coord: &GeoCoordinate,
        timeout: Duration,
    ) -> Result<RawIndexReading, FetchFailure> {
        let url = format!(
            "{}?geometry={},{}&geometryType=esriGeometryPoint&inSR=4326\
             &outFields=FSI&returnGeometry=false&f=json",
            FSI_URL, coord.longitude, coord.latitude,
        );

        tracing::debug!(coord = %coord.redacted(), source = self.name(), "querying fire severity index");

        let response = ureq::get(&url)
            .set("User-Agent", USER_AGENT)
            .timeout(timeout)
            .call()
            .map_err(classify_transport)?;

        let body: serde_json::Value = response
            .into_json()
            .map_err(|e| FetchFailure::Parse(e.to_string()))?;

        parse_fsi_body(&body)
    }
}

/// Pull the 1-5 severity class out of an ArcGIS query response.
///
/// The FSI reports a severity class, not an FWI number, so the reading
/// carries a level but no index value.
fn parse_fsi_body(body: &serde_json::Value) -> Result<RawIndexReading, FetchFailure> {
    let class = body
        .get("features")
        .and_then(|f| f.as_array())
        .and_then(|f| f.first())
        .and_then(|f| f.get("attributes"))
        .and_then(|a| a.get("FSI"))
        .and_then(|v| v.as_i64())
        .ok_or_else(|| FetchFailure::Parse("no FSI attribute in response".into()))?;

    let level = match class {
        1 => RiskLevel::Low,
        2 => RiskLevel::Moderate,
        3 => RiskLevel::High,
        4 => RiskLevel::VeryHigh,
        5 => RiskLevel::Extreme,
        other => {
            return Err(FetchFailure::Parse(format!(
                "FSI class {} outside 1-5",
                other
            )))
        }
    };

    Ok(RawIndexReading { level, index: None })
}

use gbview_core::Record;
use serde_json::Value;

use super::{api_error_detail, RecordClient};
use crate::error::{ClientError, EnrichError};
use crate::pipeline::{enrich, EnrichOptions, EnrichmentResult};

impl RecordClient {
    /// Lists the ids of records that carry a panorama link.
    ///
    /// Rows without a usable positive id are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Api`] when the API reports an error and
    /// [`ClientError::Deserialize`] when the payload is not an array.
    pub async fn list_candidate_ids(&self) -> Result<Vec<i64>, ClientError> {
        let url = self.action_url("fetchStreetView", &[]);
        let rows = self.get_rows(&url, "fetchStreetView").await?;

        let ids: Vec<i64> = rows
            .iter()
            .filter_map(|row| {
                let id = row_id(row);
                if id.is_none() {
                    tracing::debug!(row = %row, "skipping listing row without a valid id");
                }
                id
            })
            .collect();

        tracing::debug!(rows = rows.len(), ids = ids.len(), "listed candidate records");
        Ok(ids)
    }

    /// Fetches full records for the map, forwarding `filter` pairs verbatim
    /// apart from the art-visibility flag, which is sent under both
    /// `artVisible` and `art_visible`.
    ///
    /// An `action` pair in `filter` is ignored. Rows that do not deserialize
    /// as records are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Same as [`RecordClient::list_candidate_ids`].
    pub async fn map_markers(&self, filter: &[(String, String)]) -> Result<Vec<Record>, ClientError> {
        let filter = normalize_marker_filter(filter);
        let params: Vec<(&str, &str)> = filter
            .iter()
            .filter(|(key, _)| key != "action")
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect();
        let url = self.action_url("mapMarkers", &params);
        let rows = self.get_rows(&url, "mapMarkers").await?;
        Ok(records_from_rows(rows, "mapMarkers"))
    }

    /// Lists the distinct postcodes that have records, in API order.
    ///
    /// Postcodes may arrive as strings or numbers; blanks are skipped.
    ///
    /// # Errors
    ///
    /// Same as [`RecordClient::list_candidate_ids`].
    pub async fn list_zipcodes(&self) -> Result<Vec<String>, ClientError> {
        let url = self.action_url("streetviewZipcodes", &[]);
        let rows = self.get_rows(&url, "streetviewZipcodes").await?;

        let zipcodes = rows
            .iter()
            .filter_map(|row| match row {
                Value::String(s) => Some(s.trim().to_owned()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|zip| !zip.is_empty())
            .collect();
        Ok(zipcodes)
    }

    /// Records with a panorama link in one postcode, each carrying its
    /// `art_visible` flag.
    ///
    /// # Errors
    ///
    /// [`ClientError::Api`] for a postcode the API rejects (it accepts digits
    /// only) or when the API has no art-visibility column; otherwise same as
    /// [`RecordClient::list_candidate_ids`].
    pub async fn records_by_zip(&self, zipcode: &str) -> Result<Vec<Record>, ClientError> {
        let url = self.action_url("streetviewByZip", &[("zipcode", zipcode.trim())]);
        let context = format!("streetviewByZip(zipcode={})", zipcode.trim());
        let rows = self.get_rows(&url, &context).await?;
        Ok(records_from_rows(rows, &context))
    }

    /// Enriches the given ids through [`RecordClient::record_by_id`].
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::InvalidId`] if any id is not positive.
    pub async fn enrich_ids(
        &self,
        ids: &[i64],
        options: EnrichOptions,
    ) -> Result<EnrichmentResult, EnrichError> {
        enrich(ids, |id| self.record_by_id(id), options).await
    }

    /// Lists every record with a panorama link and enriches all of them.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichError::Listing`] if the listing request fails.
    pub async fn enrich_street_view(
        &self,
        options: EnrichOptions,
    ) -> Result<EnrichmentResult, EnrichError> {
        let ids = self
            .list_candidate_ids()
            .await
            .map_err(EnrichError::Listing)?;
        self.enrich_ids(&ids, options).await
    }

    async fn get_rows(&self, url: &reqwest::Url, context: &str) -> Result<Vec<Value>, ClientError> {
        let body = self.get_json(url, context).await?;
        if let Some(detail) = api_error_detail(&body) {
            return Err(ClientError::Api {
                status: 200,
                detail,
            });
        }
        serde_json::from_value::<Vec<Value>>(body).map_err(|source| ClientError::Deserialize {
            context: context.to_owned(),
            source,
        })
    }
}

fn records_from_rows(rows: Vec<Value>, context: &str) -> Vec<Record> {
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        match serde_json::from_value::<Record>(row) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(context, error = %e, "skipping malformed record row"),
        }
    }
    records
}

/// Sends the art-visibility filter under both of its wire names.
///
/// The first of `artVisible` / `art_visible` present in `filter` wins;
/// `true`/`false` become `1`/`0` and other values pass through. Both names
/// are then appended with that value. Without either key the filter is
/// returned unchanged.
pub(super) fn normalize_marker_filter(filter: &[(String, String)]) -> Vec<(String, String)> {
    let is_flag = |key: &str| key == "artVisible" || key == "art_visible";
    let flag = filter
        .iter()
        .find(|(key, _)| key == "artVisible")
        .or_else(|| filter.iter().find(|(key, _)| key == "art_visible"))
        .map(|(_, value)| match value.trim() {
            "true" => "1".to_owned(),
            "false" => "0".to_owned(),
            other => other.to_owned(),
        });

    let Some(flag) = flag else {
        return filter.to_vec();
    };

    let mut normalized: Vec<(String, String)> = filter
        .iter()
        .filter(|(key, _)| !is_flag(key.as_str()))
        .cloned()
        .collect();
    normalized.push(("artVisible".to_owned(), flag.clone()));
    normalized.push(("art_visible".to_owned(), flag));
    normalized
}

/// A positive id from a listing row, given as a number or numeric string.
pub(super) fn row_id(row: &Value) -> Option<i64> {
    let id = match row.get("id")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;
    (id > 0).then_some(id)
}

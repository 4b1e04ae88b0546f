//! Response bodies of the Alibaba Cloud DNS API (JSON format)

use ddns_core::{DnsRecord, MutationOutcome, RecordPage};
use serde::Deserialize;

/// `DescribeDomainRecords` response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeDomainRecordsResponse {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub page_number: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub domain_records: DomainRecords,
}

/// Wrapper around the record list
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DomainRecords {
    #[serde(default)]
    pub record: Vec<DomainRecord>,
}

/// One record as listed by the API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DomainRecord {
    #[serde(rename = "RR", default)]
    pub rr: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub record_id: String,
    #[serde(rename = "Type", default)]
    pub record_type: String,
    #[serde(default)]
    pub domain_name: String,
    #[serde(rename = "TTL", default)]
    pub ttl: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
}

/// `AddDomainRecord` / `UpdateDomainRecord` response
///
/// Successful calls carry only `RequestId` and `RecordId`. `Code` and
/// `Message` are present when the API reports a failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MutationResponse {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub record_id: Option<String>,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorResponse {
    #[serde(default)]
    pub request_id: Option<String>,
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl From<DomainRecord> for DnsRecord {
    fn from(record: DomainRecord) -> Self {
        DnsRecord {
            rr: record.rr,
            value: record.value,
            record_id: record.record_id,
            record_type: record.record_type,
            domain_name: record.domain_name,
        }
    }
}

impl From<DescribeDomainRecordsResponse> for RecordPage {
    fn from(response: DescribeDomainRecordsResponse) -> Self {
        RecordPage {
            total_count: response.total_count,
            page_number: response.page_number,
            page_size: response.page_size,
            records: response
                .domain_records
                .record
                .into_iter()
                .map(DnsRecord::from)
                .collect(),
        }
    }
}

impl From<MutationResponse> for MutationOutcome {
    fn from(response: MutationResponse) -> Self {
        MutationOutcome {
            code: response.code,
            message: response.message,
            record_id: response.record_id.filter(|id| !id.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_describe_response() {
        let body = r#"{
            "RequestId": "536E9CAD-DB30-4647-AC87-AA5CC38C5382",
            "TotalCount": 2,
            "PageNumber": 1,
            "PageSize": 500,
            "DomainRecords": {
                "Record": [
                    {"DomainName": "example.com", "RecordId": "9999985", "RR": "home",
                     "Type": "A", "Value": "1.2.3.4", "TTL": 600, "Line": "default",
                     "Status": "ENABLE", "Locked": false},
                    {"DomainName": "example.com", "RecordId": "9999986", "RR": "www",
                     "Type": "CNAME", "Value": "example.net", "TTL": 600}
                ]
            }
        }"#;

        let response: DescribeDomainRecordsResponse = serde_json::from_str(body).unwrap();
        let page = RecordPage::from(response);

        assert_eq!(page.total_count, 2);
        assert_eq!(page.page_number, 1);
        assert_eq!(page.page_size, 500);
        assert_eq!(page.records.len(), 2);
        assert_eq!(
            page.records[0],
            DnsRecord {
                rr: "home".to_string(),
                value: "1.2.3.4".to_string(),
                record_id: "9999985".to_string(),
                record_type: "A".to_string(),
                domain_name: "example.com".to_string(),
            }
        );
        assert_eq!(page.records[1].record_type, "CNAME");
    }

    #[test]
    fn test_parse_empty_listing() {
        let body = r#"{"RequestId": "x", "TotalCount": 0, "PageNumber": 1, "PageSize": 500,
                       "DomainRecords": {"Record": []}}"#;

        let page = RecordPage::from(serde_json::from_str::<DescribeDomainRecordsResponse>(body).unwrap());
        assert_eq!(page.total_count, 0);
        assert!(page.records.is_empty());
    }

    #[test]
    fn test_mutation_success() {
        let body = r#"{"RequestId": "536E9CAD", "RecordId": "9999985"}"#;
        let outcome = MutationOutcome::from(serde_json::from_str::<MutationResponse>(body).unwrap());

        assert!(outcome.is_success());
        assert_eq!(outcome.record_id.as_deref(), Some("9999985"));
    }

    #[test]
    fn test_mutation_failure_code() {
        let body = r#"{"RequestId": "x", "Code": "DomainRecordDuplicate", "Message": "The DNS record already exists."}"#;
        let outcome = MutationOutcome::from(serde_json::from_str::<MutationResponse>(body).unwrap());

        assert!(!outcome.is_success());
        assert_eq!(outcome.code, "DomainRecordDuplicate");
        assert_eq!(outcome.record_id, None);
    }

    #[test]
    fn test_error_body_requires_code() {
        assert!(serde_json::from_str::<ErrorResponse>(r#"{"Message": "no code"}"#).is_err());

        let err: ErrorResponse =
            serde_json::from_str(r#"{"Code": "InvalidAccessKeyId.NotFound", "Message": "Specified access key is not found."}"#)
                .unwrap();
        assert_eq!(err.code, "InvalidAccessKeyId.NotFound");
    }
}

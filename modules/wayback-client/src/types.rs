use serde::{Deserialize, Serialize};

/// One row of the CDX index: a single capture of the target site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureDescriptor {
    pub capture_id: String,
    /// `YYYYMMDDhhmmss` as a number, e.g. `20220314093000`.
    pub timestamp: u64,
    pub http_status: String,
}

impl CaptureDescriptor {
    /// Calendar year encoded in the leading four digits of the timestamp.
    pub fn year(&self) -> u32 {
        timestamp_year(self.timestamp)
    }

    pub fn is_ok(&self) -> bool {
        self.http_status == "200"
    }
}

/// Year of a `YYYYMMDDhhmmss` timestamp.
pub fn timestamp_year(timestamp: u64) -> u32 {
    (timestamp / 10_000_000_000) as u32
}

/// Parse a CDX response body into capture descriptors.
///
/// Each line is whitespace-separated: `urlkey timestamp original mimetype
/// statuscode digest length`. Only timestamp (2), status (5) and digest (6)
/// are kept. Six-field lines without the mimetype column
/// (`- timestamp original statuscode digest -`) are recognised by a status
/// code in the fourth field. Lines that are too short or carry a non-numeric
/// timestamp are dropped; the archive's order is preserved.
pub fn parse_index(body: &str) -> Vec<CaptureDescriptor> {
    body.lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 6 {
                return None;
            }
            let timestamp = fields[1].parse::<u64>().ok()?;
            let (status, id) = if fields.len() == 6 && is_status_code(fields[3]) {
                (fields[3], fields[4])
            } else {
                (fields[4], fields[5])
            };
            Some(CaptureDescriptor {
                capture_id: id.to_string(),
                timestamp,
                http_status: status.to_string(),
            })
        })
        .collect()
}

fn is_status_code(field: &str) -> bool {
    field.len() == 3 && field.bytes().all(|b| b.is_ascii_digit())
}

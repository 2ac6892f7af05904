use std::process::ExitCode;

use anyhow::{Context, Result};
use content_sync::{ErrorInfo, MULTI_STATUS_ERROR_CODE, MultiStatus};
use serde::Serialize;
use serde_json::Value;

/// Exit code of a command that completed with per-item failures.
pub const MULTI_STATUS_EXIT: u8 = 2;

/// What a command prints on stdout.
#[derive(Debug)]
pub struct Output {
    pub body: Value,
    pub multi_status: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<'a, T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<&'static str>,
    items: &'a T,
    errors: &'a [ErrorInfo],
}

impl Output {
    pub fn complete(value: &impl Serialize) -> Result<Self> {
        Ok(Self {
            body: serde_json::to_value(value).context("failed to serialize output")?,
            multi_status: false,
        })
    }

    pub fn from_multi_status<T: Serialize>(status: &MultiStatus<T>) -> Result<Self> {
        let multi_status = status.is_multi_status();
        let envelope = Envelope {
            error_code: multi_status.then_some(MULTI_STATUS_ERROR_CODE),
            items: &status.items,
            errors: &status.errors,
        };
        Ok(Self {
            body: serde_json::to_value(&envelope).context("failed to serialize output")?,
            multi_status,
        })
    }

    pub fn print(&self) -> Result<ExitCode> {
        let rendered =
            serde_json::to_string_pretty(&self.body).context("failed to render output")?;
        println!("{rendered}");

        if self.multi_status {
            tracing::warn!("completed with per-item errors");
            Ok(ExitCode::from(MULTI_STATUS_EXIT))
        } else {
            Ok(ExitCode::SUCCESS)
        }
    }
}

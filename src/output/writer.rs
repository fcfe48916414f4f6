//! Standard result writer: stdout, optional file, optional field store

use crate::config::OutputConfig;
use crate::fields::{derive_fields, FieldRegistry, FieldStore, RequestedField};
use crate::output::{CrawlResult, OutputError, OutputHandler, OutputResult};
use indexmap::IndexMap;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Mutex;

/// JSON line layout: the result plus its derived fields
#[derive(Serialize)]
struct JsonRecord<'a> {
    #[serde(flatten)]
    result: &'a CrawlResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<IndexMap<String, Vec<String>>>,
}

/// Writes results as plain lines or JSON lines
///
/// * Plain, no fields: the URL
/// * Plain, with fields: one line per derived value
/// * JSON: one object per result, derived values under `fields`
///
/// Stored fields go to the field store independently of the stream.
pub struct StandardWriter {
    json: bool,
    stdout: bool,
    fields: Option<Vec<RequestedField>>,
    store_fields: Option<Vec<RequestedField>>,
    field_store: Option<FieldStore>,
    file: Option<Mutex<BufWriter<File>>>,
}

impl StandardWriter {
    /// Builds a writer from output configuration
    ///
    /// Field lists are validated against `registry` here, before any crawling.
    pub fn from_config(config: &OutputConfig, registry: &FieldRegistry) -> crate::Result<Self> {
        let fields = config
            .fields
            .as_deref()
            .map(|list| registry.parse(list))
            .transpose()?;
        let store_fields = config
            .store_fields
            .as_deref()
            .map(|list| registry.parse(list))
            .transpose()?;

        let field_store = match store_fields {
            Some(_) => Some(FieldStore::new(&config.store_fields_directory)?),
            None => None,
        };

        let file = match &config.file {
            Some(path) => Some(Mutex::new(BufWriter::new(File::create(path)?))),
            None => None,
        };

        Ok(Self {
            json: config.json,
            stdout: true,
            fields,
            store_fields,
            field_store,
            file,
        })
    }

    /// Disables writing to stdout (results still go to the file and store)
    pub fn without_stdout(mut self) -> Self {
        self.stdout = false;
        self
    }

    /// Renders the output lines for a result
    pub fn format_result(&self, result: &CrawlResult) -> OutputResult<Vec<String>> {
        if self.json {
            let fields = self.fields.as_ref().map(|requested| {
                let mut grouped: IndexMap<String, Vec<String>> = requested
                    .iter()
                    .map(|f| (f.name().to_string(), Vec::new()))
                    .collect();
                for row in derive_fields(result, requested) {
                    grouped.entry(row.field).or_default().push(row.value);
                }
                grouped
            });
            let line = serde_json::to_string(&JsonRecord { result, fields })
                .map_err(|e| OutputError::Format(e.to_string()))?;
            return Ok(vec![line]);
        }

        match &self.fields {
            Some(requested) => Ok(derive_fields(result, requested)
                .into_iter()
                .map(|row| row.value)
                .collect()),
            None => Ok(vec![result.url.clone()]),
        }
    }
}

impl OutputHandler for StandardWriter {
    fn write(&self, result: &CrawlResult) -> OutputResult<()> {
        if let (Some(store), Some(requested)) = (&self.field_store, &self.store_fields) {
            store.store(result, requested);
        }

        let lines = self.format_result(result)?;
        if lines.is_empty() {
            return Ok(());
        }

        if self.stdout {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            for line in &lines {
                writeln!(handle, "{}", line)?;
            }
        }

        if let Some(file) = &self.file {
            let mut file = file
                .lock()
                .map_err(|_| OutputError::Write("output file lock poisoned".to_string()))?;
            for line in &lines {
                writeln!(file, "{}", line)?;
            }
        }
        Ok(())
    }

    fn close(&self) -> OutputResult<()> {
        if let Some(file) = &self.file {
            let mut file = file
                .lock()
                .map_err(|_| OutputError::Write("output file lock poisoned".to_string()))?;
            file.flush()?;
        }
        Ok(())
    }
}

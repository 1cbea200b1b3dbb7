use log::{debug, info};
use std::collections::HashMap;

use crate::env::EnvPair;
use crate::store::{ParameterStore, Result, StoreError};

/// GetParameters accepts at most this many names per request
const FETCH_BATCH_SIZE: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Only names starting with this are injected, with the prefix removed
    pub prefix: String,
    pub decrypt: bool,
    /// Cap on listing calls; `None` follows continuation tokens until the store stops
    pub max_pages: Option<usize>,
}

/// Walk every page of the store and turn matching parameters into env entries.
///
/// Any listing or fetch failure aborts the whole extraction.
pub fn extract<S: ParameterStore + ?Sized>(store: &S, options: &ExtractOptions) -> Result<Vec<EnvPair>> {
    let mut extracted = Vec::new();
    let mut next_token: Option<String> = None;
    let mut pages = 0;

    loop {
        if let Some(limit) = options.max_pages {
            if pages >= limit {
                return Err(StoreError::PageLimit(limit));
            }
        }

        let page = store.list_parameter_names(next_token.as_deref())?;
        pages += 1;
        debug!("Page {} listed {} parameters", pages, page.names.len());

        let selected: Vec<(String, String)> = page
            .names
            .into_iter()
            .filter_map(|name| match name.strip_prefix(options.prefix.as_str()) {
                Some(key) => {
                    info!("Injecting {} as {}", name, key);
                    let key = key.to_string();
                    Some((name, key))
                }
                None => {
                    info!("Skipping {}", name);
                    None
                }
            })
            .collect();

        for batch in selected.chunks(FETCH_BATCH_SIZE) {
            let names: Vec<String> = batch.iter().map(|(name, _)| name.clone()).collect();
            let mut values: HashMap<String, String> = store
                .get_parameter_values(&names, options.decrypt)?
                .into_iter()
                .map(|param| (param.name, param.value))
                .collect();

            for (name, key) in batch {
                let value = values
                    .remove(name)
                    .ok_or_else(|| StoreError::Fetch(format!("no value returned for {}", name)))?;
                extracted.push(EnvPair::new(key.as_str(), value));
            }
        }

        match page.next_token {
            Some(token) => next_token = Some(token),
            None => break,
        }
    }

    Ok(extracted)
}

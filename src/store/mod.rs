mod ssm;

pub use ssm::SsmStore;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to establish parameter store session: {0}")]
    Session(String),

    #[error("failed to list parameters: {0}")]
    Listing(String),

    #[error("failed to fetch parameter values: {0}")]
    Fetch(String),

    #[error("parameter listing still paginating after {0} pages")]
    PageLimit(usize),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// One page of parameter names from a listing pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterPage {
    pub names: Vec<String>,
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub value: String,
}

/// Remote key-value parameter store
///
/// Listing is paginated by an opaque continuation token: `None` asks for the
/// first page, and a page without a `next_token` is the last one.
pub trait ParameterStore {
    fn list_parameter_names(&self, next_token: Option<&str>) -> Result<ParameterPage>;

    fn get_parameter_values(&self, names: &[String], decrypt: bool) -> Result<Vec<Parameter>>;
}

#[cfg(test)]
pub mod fake {
    use super::{Parameter, ParameterPage, ParameterStore, Result, StoreError};
    use std::cell::{Cell, RefCell};

    /// In-memory store serving pre-built pages, chained by token "page-N"
    pub struct FakeStore {
        pages: Vec<Vec<(String, String)>>,
        fail_listing_at: Option<usize>,
        fail_fetch_of: Option<String>,
        pub list_calls: Cell<usize>,
        pub fetch_calls: RefCell<Vec<(Vec<String>, bool)>>,
    }

    impl FakeStore {
        pub fn new(pages: Vec<Vec<(&str, &str)>>) -> Self {
            Self {
                pages: pages
                    .into_iter()
                    .map(|page| {
                        page.into_iter()
                            .map(|(n, v)| (n.to_string(), v.to_string()))
                            .collect()
                    })
                    .collect(),
                fail_listing_at: None,
                fail_fetch_of: None,
                list_calls: Cell::new(0),
                fetch_calls: RefCell::new(Vec::new()),
            }
        }

        pub fn failing_listing_at(mut self, page: usize) -> Self {
            self.fail_listing_at = Some(page);
            self
        }

        pub fn failing_fetch_of(mut self, name: &str) -> Self {
            self.fail_fetch_of = Some(name.to_string());
            self
        }

        fn lookup(&self, name: &str) -> Option<&str> {
            self.pages
                .iter()
                .flatten()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        }
    }

    impl ParameterStore for FakeStore {
        fn list_parameter_names(&self, next_token: Option<&str>) -> Result<ParameterPage> {
            self.list_calls.set(self.list_calls.get() + 1);

            let index = match next_token {
                None => 0,
                Some(token) => token
                    .strip_prefix("page-")
                    .and_then(|n| n.parse().ok())
                    .ok_or_else(|| StoreError::Listing(format!("bad token {}", token)))?,
            };

            if self.fail_listing_at == Some(index) {
                return Err(StoreError::Listing(format!("page {} unavailable", index)));
            }

            let names = self
                .pages
                .get(index)
                .map(|page| page.iter().map(|(n, _)| n.clone()).collect())
                .unwrap_or_default();
            let next_token = (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));

            Ok(ParameterPage { names, next_token })
        }

        fn get_parameter_values(&self, names: &[String], decrypt: bool) -> Result<Vec<Parameter>> {
            self.fetch_calls.borrow_mut().push((names.to_vec(), decrypt));

            // Returned in reverse to mimic a store with no ordering guarantee
            names
                .iter()
                .rev()
                .map(|name| {
                    if self.fail_fetch_of.as_deref() == Some(name.as_str()) {
                        return Err(StoreError::Fetch(format!("access denied for {}", name)));
                    }
                    let value = self
                        .lookup(name)
                        .ok_or_else(|| StoreError::Fetch(format!("unknown parameter {}", name)))?;
                    let value = if decrypt {
                        value.to_string()
                    } else {
                        format!("cipher:{}", value)
                    };
                    Ok(Parameter {
                        name: name.clone(),
                        value,
                    })
                })
                .collect()
        }
    }
}

use std::collections::VecDeque;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::c8y_api::C8yClient;
use super::platform::PlatformError;

/// Walks a collection resource page by page, fetching the next page only once the
/// previous one has been handed out. Iteration stops at the first empty page or
/// after the first error. A page shorter than requested does not end the walk since
/// the platform may cap the page size below the requested one.
pub struct PageIter<'a, T> {
    client: &'a C8yClient,
    url: Url,
    key: &'static str,
    filter: Vec<(&'static str, String)>,
    current_page: u32,
    buffer: VecDeque<Value>,
    exhausted: bool,
    _item: PhantomData<T>,
}

impl<'a, T: DeserializeOwned> PageIter<'a, T> {
    pub fn new(
        client: &'a C8yClient,
        url: Url,
        key: &'static str,
        filter: Vec<(&'static str, String)>,
    ) -> Self {
        PageIter {
            client,
            url,
            key,
            filter,
            current_page: 0,
            buffer: VecDeque::new(),
            exhausted: false,
            _item: PhantomData,
        }
    }

    fn fetch_next_page(&mut self) -> Result<(), PlatformError> {
        self.current_page += 1;
        let page_size = self.client.page_size();
        let mut query = self.filter.clone();
        query.push(("pageSize", page_size.to_string()));
        query.push(("currentPage", self.current_page.to_string()));

        let mut page: Value = self.client.get_json(&self.url, &query)?;
        let elements = match page.get_mut(self.key).map(Value::take) {
            Some(Value::Array(elements)) => elements,
            _ => {
                return Err(PlatformError::MissingCollection {
                    url: self.url.to_string(),
                    key: self.key,
                })
            }
        };
        log::debug!(
            "Page {} of {} holds {} {}",
            self.current_page,
            self.url,
            elements.len(),
            self.key
        );
        if elements.is_empty() {
            self.exhausted = true;
        }
        self.buffer.extend(elements);
        Ok(())
    }

    fn decode(&self, element: Value) -> Result<T, PlatformError> {
        serde_json::from_value(element).map_err(|source| PlatformError::Decode {
            url: self.url.to_string(),
            source,
        })
    }
}

impl<T: DeserializeOwned> Iterator for PageIter<'_, T> {
    type Item = Result<T, PlatformError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(element) = self.buffer.pop_front() {
                return Some(self.decode(element));
            }
            if self.exhausted {
                return None;
            }
            if let Err(e) = self.fetch_next_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
    }
}

use async_trait::async_trait;
use genai_relay::{
    Error, Result,
    documents::DocumentExtractor,
    llm::{ModelClient, Part},
    uploads::Upload,
};
use std::sync::{Arc, Mutex};

/// Mock model client for testing
#[derive(Debug, Clone)]
pub struct MockModelClient {
    pub requests: Arc<Mutex<Vec<Vec<Part>>>>,
    pub response: String,
    pub error: Option<String>,
}

impl MockModelClient {
    pub fn new() -> Self {
        Self::with_response("mock output")
    }

    pub fn with_response(response: &str) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            response: response.to_string(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn get_requests(&self) -> Vec<Vec<Part>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn generate_content(&self, parts: Vec<Part>) -> Result<String> {
        self.requests.lock().unwrap().push(parts);

        if let Some(ref error) = self.error {
            return Err(Error::llm(error.clone()));
        }

        Ok(self.response.clone())
    }
}

impl Default for MockModelClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Mock document extractor returning canned text
#[derive(Debug, Clone)]
pub struct MockExtractor {
    pub text: String,
    pub error: Option<String>,
}

impl MockExtractor {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            error: None,
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            text: String::new(),
            error: Some(error.to_string()),
        }
    }
}

#[async_trait]
impl DocumentExtractor for MockExtractor {
    async fn extract(&self, upload: &Upload) -> Result<String> {
        // The staged file must still be there while the request is in flight.
        assert!(upload.path().exists(), "upload released before extraction");

        match self.error {
            Some(ref error) => Err(Error::extraction(error.clone())),
            None => Ok(self.text.clone()),
        }
    }
}

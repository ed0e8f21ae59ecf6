//! Two-step sequences spanning the object store and the product table
//!
//! Creating a product uploads the image and then writes the record; removing
//! one deletes the image and then the record. Neither sequence is atomic and
//! nothing is compensated. A [`Saga`] tracks which steps committed so that a
//! failure reports exactly which inconsistency it left behind:
//!
//! ```text
//! Started -> Committed(first) -> Committed(second) -> Done
//!        \                   \
//!         Failed(first)       Failed(second)  (+ Inconsistency)
//! ```

use std::fmt;
use std::future::Future;
use thiserror::Error;
use tracing::{debug, warn};

use crate::db::TableError;
use crate::storage::ObjectStoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Remove,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => f.write_str("create"),
            Operation::Remove => f.write_str("remove"),
        }
    }
}

/// A single external call within a saga
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    UploadImage,
    WriteRecord,
    DeleteImage,
    DeleteRecord,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::UploadImage => "upload image",
            Step::WriteRecord => "write record",
            Step::DeleteImage => "delete image",
            Step::DeleteRecord => "delete record",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SagaState {
    Started,
    Committed(Step),
    Done,
    Failed(Step),
}

/// State left behind when the second step of a saga fails
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    /// Image uploaded, record never written
    OrphanedImage { key: String },
    /// Image deleted, record still in the table
    DanglingRecord { product_id: String, image_key: String },
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inconsistency::OrphanedImage { key } => write!(f, "orphaned image {}", key),
            Inconsistency::DanglingRecord { product_id, image_key } => {
                write!(f, "record {} references deleted image {}", product_id, image_key)
            }
        }
    }
}

/// Failure of the external call behind a step
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    ObjectStore(#[from] ObjectStoreError),
    #[error(transparent)]
    Table(#[from] TableError),
}

#[derive(Debug, Error)]
#[error("{operation} of product {product_id} failed at {failed}")]
pub struct SagaError {
    pub operation: Operation,
    pub product_id: String,
    pub failed: Step,
    pub completed: Vec<Step>,
    pub inconsistency: Option<Inconsistency>,
    #[source]
    pub source: StepError,
}

pub struct Saga {
    operation: Operation,
    product_id: String,
    image_key: Option<String>,
    completed: Vec<Step>,
    state: SagaState,
}

impl Saga {
    pub fn create(product_id: &str, image_key: &str) -> Self {
        Self::new(Operation::Create, product_id, Some(image_key))
    }

    /// `image_key` is `None` when the record carries no image reference
    pub fn remove(product_id: &str, image_key: Option<&str>) -> Self {
        Self::new(Operation::Remove, product_id, image_key)
    }

    fn new(operation: Operation, product_id: &str, image_key: Option<&str>) -> Self {
        Self {
            operation,
            product_id: product_id.to_string(),
            image_key: image_key.map(String::from),
            completed: Vec::new(),
            state: SagaState::Started,
        }
    }

    pub fn state(&self) -> SagaState {
        self.state
    }

    pub fn completed(&self) -> &[Step] {
        &self.completed
    }

    /// Await one external call. On failure the saga moves to `Failed` and the
    /// returned error carries the committed steps and any inconsistency.
    pub async fn step<T, E, F>(&mut self, step: Step, call: F) -> Result<T, SagaError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<StepError>,
    {
        match call.await {
            Ok(value) => {
                self.completed.push(step);
                self.state = SagaState::Committed(step);
                debug!(operation = %self.operation, product_id = %self.product_id, step = %step, "Saga step committed");
                Ok(value)
            }
            Err(err) => {
                self.state = SagaState::Failed(step);
                let inconsistency = self.inconsistency_after(step);

                if let Some(inconsistency) = &inconsistency {
                    warn!(
                        operation = %self.operation,
                        product_id = %self.product_id,
                        step = %step,
                        inconsistency = %inconsistency,
                        "Saga failed after a committed step"
                    );
                }

                Err(SagaError {
                    operation: self.operation,
                    product_id: self.product_id.clone(),
                    failed: step,
                    completed: self.completed.clone(),
                    inconsistency,
                    source: err.into(),
                })
            }
        }
    }

    pub fn finish(&mut self) {
        self.state = SagaState::Done;
    }

    fn inconsistency_after(&self, failed: Step) -> Option<Inconsistency> {
        let image_key = self.image_key.clone().unwrap_or_default();

        match (self.operation, failed) {
            (Operation::Create, Step::WriteRecord) if self.completed.contains(&Step::UploadImage) => {
                Some(Inconsistency::OrphanedImage { key: image_key })
            }
            (Operation::Remove, Step::DeleteRecord) if self.completed.contains(&Step::DeleteImage) => {
                Some(Inconsistency::DanglingRecord {
                    product_id: self.product_id.clone(),
                    image_key,
                })
            }
            _ => None,
        }
    }
}

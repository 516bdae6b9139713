pub mod error;
pub mod file;
pub mod lock;
pub mod memory;
pub mod sample;
pub mod snapshot;
pub mod traits;

pub use error::RepositoryError;
pub use file::SnapshotFileRepository;
pub use memory::InMemoryClaimRepository;
pub use traits::{ClaimPaymentRepository, ConfirmOutcome, InvoiceOutcome};

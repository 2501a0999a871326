//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! Write operations that participate in a larger lifecycle transition take
//! the `DatabaseTransaction` handle explicitly, so their scope is visible at
//! every call site.

pub mod custody;
pub mod float_ledger;
pub mod gl;
mod history;
pub mod organization;
pub mod parameter;
pub mod till;
pub mod transfer;

pub use custody::{CustodyError, CustodyRepository};
pub use float_ledger::{
    CloseAllOutcome, FloatLedgerError, FloatLedgerRepository, PeriodCloseOutcome,
    PeriodCloseStatus,
};
pub use gl::{GlError, GlRepository, GlTransactionWithEntries};
pub use organization::OrganizationRepository;
pub use parameter::{ParameterRepository, PARAM_REQUIRE_OPEN_TILL};
pub use till::{TillError, TillSessionRepository};
pub use transfer::{
    CreateOutboundInput, NegotiatedRate, TransferError, TransferFilter, TransferService,
    TransferWithCharges, UpdateOutboundInput,
};

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDFMaster toolkit — file intake, the operation dispatcher and its strategies,
// the interactive session, and artifact delivery.

pub mod delivery;
pub mod dispatcher;
pub mod intake;
pub mod operations;
pub mod session;

pub use delivery::{ArtifactSink, DeliveryReceipt, FileSystemSink, hash_bytes};
pub use dispatcher::{DispatchRequest, Dispatcher};
pub use intake::{FileSource, InputFile, WorkingSet};
pub use operations::{Artifact, Notice, Operation, OperationRegistry, ProcessingResult};
pub use session::{Session, SessionOutcome, SessionStatus};

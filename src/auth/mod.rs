// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

pub mod password;
mod reset_tokens;
mod service;
mod store;
pub(crate) mod types;

pub use password::{hash_password, verify_password};
pub use reset_tokens::{PendingReset, ResetTokenStore, RESET_TOKEN_TTL_SECONDS};
pub use service::{EmployeeService, ServiceError, ServiceResult};
pub use store::{EmployeeStore, FileEmployeeStore};
#[cfg(test)]
pub use store::MemoryEmployeeStore;
pub use types::{BugReport, Employee, FeedbackEntry, PortalData};

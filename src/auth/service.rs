// This file is part of the product Pulsedesk.
// SPDX-FileCopyrightText: 2026 Pulsedesk Contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use super::password::{self, PasswordError};
use super::store::EmployeeStore;
use super::types::{BugReport, Employee, FeedbackEntry, PortalData, BUG_STATUS_NEW};
use crate::companies::Company;
use crate::config::Argon2Params;
use chrono::Utc;
use std::fmt;
use std::sync::Arc;

/// Error taxonomy for the credential and feedback operations. `Validation`
/// text is shown to the user verbatim; `Authentication` and
/// `IdentityNotVerified` map to fixed generic messages so failed lookups and
/// failed verifications are indistinguishable; `Infrastructure` details are
/// logged and never shown.
#[derive(Debug)]
pub enum ServiceError {
    Validation(String),
    Authentication,
    IdentityNotVerified,
    DuplicateEmail,
    Infrastructure(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Validation(message) => write!(f, "{}", message),
            ServiceError::Authentication => write!(f, "Invalid email or password."),
            ServiceError::IdentityNotVerified => {
                write!(f, "The provided email and company combination was not found.")
            }
            ServiceError::DuplicateEmail => {
                write!(f, "This email address is already registered.")
            }
            ServiceError::Infrastructure(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Infrastructure(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub struct EmployeeService {
    store: Arc<dyn EmployeeStore>,
    password_params: Argon2Params,
    dummy_hash: String,
}

impl EmployeeService {
    pub fn new(
        store: Arc<dyn EmployeeStore>,
        password_params: Argon2Params,
    ) -> Result<Self, PasswordError> {
        let dummy_hash = password::build_dummy_hash(&password_params)?;
        Ok(Self {
            store,
            password_params,
            dummy_hash,
        })
    }

    fn load(&self) -> ServiceResult<PortalData> {
        self.store
            .load()
            .map_err(|err| ServiceError::Infrastructure(err.to_string()))
    }

    fn save(&self, data: &PortalData) -> ServiceResult<()> {
        self.store
            .save(data)
            .map_err(|err| ServiceError::Infrastructure(err.to_string()))
    }

    /// Case-insensitive single-record lookup.
    pub fn find_by_email(&self, email: &str) -> ServiceResult<Option<Employee>> {
        let data = self.load()?;
        Ok(data.employees.get(&email_key(email)).cloned())
    }

    pub fn find_by_id(&self, user_id: u64) -> ServiceResult<Option<Employee>> {
        let data = self.load()?;
        Ok(data
            .employees
            .values()
            .find(|employee| employee.id == user_id)
            .cloned())
    }

    /// Reset stage 1: exactly one record must match both email and company.
    /// Zero matches and any ambiguity both come back `None`; callers render
    /// one generic message for either case.
    pub fn verify_identity(
        &self,
        email: &str,
        company: Company,
    ) -> ServiceResult<Option<Employee>> {
        let data = self.load()?;
        let mut matches = data
            .employees
            .values()
            .filter(|employee| {
                email_key(&employee.email) == email_key(email) && employee.company == company
            })
            .cloned();
        let first = matches.next();
        if matches.next().is_some() {
            return Ok(None);
        }
        Ok(first)
    }

    /// Verify credentials. When no account matches the email the submitted
    /// password is still verified against a dummy hash so both failure paths
    /// cost about the same.
    pub fn authenticate(&self, email: &str, plaintext: &str) -> ServiceResult<Option<Employee>> {
        let data = self.load()?;
        let employee = data.employees.get(&email_key(email));
        let stored_hash = employee
            .map(|record| record.password_hash.as_str())
            .unwrap_or(self.dummy_hash.as_str());

        let valid = password::verify_password(plaintext, stored_hash);
        if valid && employee.is_some() {
            Ok(employee.cloned())
        } else {
            Ok(None)
        }
    }

    pub fn register(
        &self,
        name: &str,
        email: &str,
        plaintext: &str,
        company: Company,
        role: &str,
    ) -> ServiceResult<Employee> {
        let mut data = self.load()?;
        if data.employees.contains_key(&email_key(email)) {
            return Err(ServiceError::DuplicateEmail);
        }

        let password_hash = password::hash_password(plaintext, &self.password_params)?;
        let employee = Employee {
            id: data.next_employee_id,
            email: email.trim().to_string(),
            name: name.to_string(),
            password_hash,
            company,
            role: role.to_string(),
            photo_path: None,
        };
        data.next_employee_id += 1;
        data.employees.insert(email_key(email), employee.clone());
        self.save(&data)?;
        log::info!(
            "Registered employee {} ({}) for {}",
            employee.id,
            email_key(email),
            company.key()
        );
        Ok(employee)
    }

    /// Password change for an authenticated user. The current password is
    /// re-verified against the stored hash before anything is written.
    pub fn change_password(
        &self,
        user_id: u64,
        current: &str,
        new: &str,
    ) -> ServiceResult<()> {
        let mut data = self.load()?;
        let key = data
            .employees
            .iter()
            .find(|(_, employee)| employee.id == user_id)
            .map(|(key, _)| key.clone())
            .ok_or_else(|| {
                ServiceError::Infrastructure(format!(
                    "Employee {} not found during password change",
                    user_id
                ))
            })?;

        let stored_hash = data.employees[&key].password_hash.clone();
        if !password::verify_password(current, &stored_hash) {
            return Err(ServiceError::Validation(
                "Incorrect current password.".to_string(),
            ));
        }
        if current == new {
            return Err(ServiceError::Validation(
                "New password cannot be the same as the current password.".to_string(),
            ));
        }

        let new_hash = password::hash_password(new, &self.password_params)?;
        if let Some(employee) = data.employees.get_mut(&key) {
            employee.password_hash = new_hash;
        }
        self.save(&data)?;
        log::info!("Password changed for employee {}", user_id);
        Ok(())
    }

    /// Password reset completion; identity has already been proven through
    /// the one-time reset token.
    pub fn reset_password(&self, user_id: u64, new: &str) -> ServiceResult<()> {
        let mut data = self.load()?;
        let key = data
            .employees
            .iter()
            .find(|(_, employee)| employee.id == user_id)
            .map(|(key, _)| key.clone())
            .ok_or_else(|| {
                ServiceError::Infrastructure(format!(
                    "Employee {} not found during password reset",
                    user_id
                ))
            })?;

        let new_hash = password::hash_password(new, &self.password_params)?;
        if let Some(employee) = data.employees.get_mut(&key) {
            employee.password_hash = new_hash;
        }
        self.save(&data)?;
        log::info!("Password reset for employee {}", user_id);
        Ok(())
    }

    pub fn record_feedback(&self, name: &str, email: &str, message: &str) -> ServiceResult<()> {
        let mut data = self.load()?;
        data.feedback.push(FeedbackEntry {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
            submitted_at: Utc::now(),
        });
        self.save(&data)
    }

    pub fn record_bug_report(
        &self,
        reporter_id: u64,
        page_url: Option<String>,
        description: &str,
    ) -> ServiceResult<()> {
        let mut data = self.load()?;
        data.bug_reports.push(BugReport {
            reporter_id,
            page_url,
            description: description.to_string(),
            status: BUG_STATUS_NEW.to_string(),
            reported_at: Utc::now(),
        });
        self.save(&data)
    }

    /// Point the employee at a new photo. Returns the path the new one
    /// supersedes so the caller can remove the orphaned file.
    pub fn set_photo_path(&self, user_id: u64, path: &str) -> ServiceResult<Option<String>> {
        let mut data = self.load()?;
        let employee = data
            .employees
            .values_mut()
            .find(|employee| employee.id == user_id)
            .ok_or_else(|| {
                ServiceError::Infrastructure(format!(
                    "Employee {} not found during photo update",
                    user_id
                ))
            })?;
        let previous = employee.photo_path.replace(path.to_string());
        self.save(&data)?;
        Ok(previous)
    }

    /// Delete the employee and every dependent record in one save. The store
    /// replaces its file atomically, so a failed save leaves the account and
    /// its dependents exactly as they were.
    pub fn delete_account(&self, user_id: u64) -> ServiceResult<()> {
        let mut data = self.load()?;
        let entry = data
            .employees
            .iter()
            .find(|(_, employee)| employee.id == user_id)
            .map(|(key, employee)| (key.clone(), email_key(&employee.email)));
        let (key, email) = match entry {
            Some(found) => found,
            None => {
                return Err(ServiceError::Infrastructure(format!(
                    "Employee {} not found during account deletion",
                    user_id
                )));
            }
        };

        data.feedback
            .retain(|entry| email_key(&entry.email) != email);
        data.bug_reports
            .retain(|report| report.reporter_id != user_id);
        data.employees.remove(&key);
        self.save(&data)?;
        log::info!("Deleted employee {} and dependent records", user_id);
        Ok(())
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles as reported by the contract.

use serde::Serialize;

use crate::blockchain::{ROLE_ADMIN, ROLE_BANK_EMPLOYEE, ROLE_CUSTOMER, ROLE_NONE};

/// Role of an account in the KYC workflow.
///
/// ## Role Hierarchy
///
/// - `Admin` - Grants roles, activates users, gives final approval
/// - `BankEmployee` - Verifies or rejects applications for one branch
/// - `Customer` - Submits and updates its own application
/// - `Unregistered` - No role on-chain yet
///
/// Never stored authoritatively: always re-read from the contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(tag = "role", content = "ifsc", rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Unregistered,
    Customer,
    /// Carries the branch (IFSC) code, empty if it could not be read.
    BankEmployee(String),
    Admin,
}

impl UserRole {
    /// Decode a role code. Unknown codes are treated as unregistered.
    pub fn from_code(code: u8, ifsc: impl Into<String>) -> Self {
        match code {
            ROLE_NONE => UserRole::Unregistered,
            ROLE_CUSTOMER => UserRole::Customer,
            ROLE_BANK_EMPLOYEE => UserRole::BankEmployee(ifsc.into()),
            ROLE_ADMIN => UserRole::Admin,
            other => {
                tracing::warn!(role_code = other, "Unknown role code, treating as unregistered");
                UserRole::Unregistered
            }
        }
    }

    /// Any role other than unregistered.
    pub fn is_registered(&self) -> bool {
        !matches!(self, UserRole::Unregistered)
    }

    /// Check if the role is Admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Check if the role is BankEmployee, whatever the branch.
    pub fn is_bank_employee(&self) -> bool {
        matches!(self, UserRole::BankEmployee(_))
    }

    /// Check if the role is Customer.
    pub fn is_customer(&self) -> bool {
        matches!(self, UserRole::Customer)
    }

    /// Branch code of a bank employee.
    pub fn ifsc(&self) -> Option<&str> {
        match self {
            UserRole::BankEmployee(ifsc) => Some(ifsc),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Unregistered => write!(f, "unregistered"),
            UserRole::Customer => write!(f, "customer"),
            UserRole::BankEmployee(ifsc) if ifsc.is_empty() => write!(f, "bank_employee"),
            UserRole::BankEmployee(ifsc) => write!(f, "bank_employee ({ifsc})"),
            UserRole::Admin => write!(f, "admin"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_roles() {
        assert_eq!(UserRole::from_code(0, ""), UserRole::Unregistered);
        assert_eq!(UserRole::from_code(1, "ignored"), UserRole::Customer);
        assert_eq!(
            UserRole::from_code(2, "SBIN0001234"),
            UserRole::BankEmployee("SBIN0001234".to_string())
        );
        assert_eq!(UserRole::from_code(3, ""), UserRole::Admin);
        assert_eq!(UserRole::from_code(42, ""), UserRole::Unregistered);
    }

    #[test]
    fn exactly_one_flag_for_registered_roles() {
        for role in [
            UserRole::Customer,
            UserRole::BankEmployee("X".into()),
            UserRole::Admin,
        ] {
            let flags = [role.is_admin(), role.is_bank_employee(), role.is_customer()];
            assert_eq!(flags.iter().filter(|f| **f).count(), 1, "{role}");
            assert!(role.is_registered());
        }

        let none = UserRole::Unregistered;
        assert!(!none.is_admin() && !none.is_bank_employee() && !none.is_customer());
        assert!(!none.is_registered());
    }

    #[test]
    fn ifsc_only_for_employees() {
        assert_eq!(UserRole::BankEmployee("HDFC0005678".into()).ifsc(), Some("HDFC0005678"));
        assert_eq!(UserRole::Admin.ifsc(), None);
    }

    #[test]
    fn serializes_with_tag() {
        let json = serde_json::to_value(UserRole::BankEmployee("SBIN0001234".into())).unwrap();
        assert_eq!(json, serde_json::json!({"role": "bank_employee", "ifsc": "SBIN0001234"}));

        let json = serde_json::to_value(UserRole::Admin).unwrap();
        assert_eq!(json, serde_json::json!({"role": "admin"}));
    }
}

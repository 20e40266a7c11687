use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    /// Chat channels this account takes part in.
    #[serde(default)]
    pub channels: Vec<String>,
}

struct Entry {
    account: Account,
    password_sha256: String,
}

/// Hex SHA-256 of `password`.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// In-memory account list standing in for a real identity provider.
pub struct UserDirectory {
    by_email: RwLock<HashMap<String, Entry>>,
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::seeded()
    }
}

impl UserDirectory {
    pub fn empty() -> Self {
        UserDirectory {
            by_email: RwLock::new(HashMap::new()),
        }
    }

    /// Demo accounts: one admin, two students.
    pub fn seeded() -> Self {
        let dir = Self::empty();
        dir.insert(
            Account {
                id: "admin-1".into(),
                email: "admin@campus.local".into(),
                name: "Campus Admin".into(),
                role: Role::Admin,
                channels: vec!["general".into(), "staff".into()],
            },
            "admin123",
        );
        dir.insert(
            Account {
                id: "student-1".into(),
                email: "alex@campus.local".into(),
                name: "Alex Student".into(),
                role: Role::Student,
                channels: vec!["general".into(), "study-group".into()],
            },
            "student123",
        );
        dir.insert(
            Account {
                id: "student-2".into(),
                email: "sam@campus.local".into(),
                name: "Sam Student".into(),
                role: Role::Student,
                channels: vec!["general".into()],
            },
            "student123",
        );
        dir
    }

    pub fn insert(&self, account: Account, password: &str) {
        let mut map = self.by_email.write().unwrap_or_else(|e| e.into_inner());
        map.insert(
            normalize_email(&account.email),
            Entry {
                account,
                password_sha256: hash_password(password),
            },
        );
    }

    pub fn authenticate(&self, email: &str, password: &str) -> Option<Account> {
        let map = self.by_email.read().unwrap_or_else(|e| e.into_inner());
        let entry = map.get(&normalize_email(email))?;
        if entry.password_sha256 == hash_password(password) {
            Some(entry.account.clone())
        } else {
            None
        }
    }

    pub fn get(&self, id: &str) -> Option<Account> {
        let map = self.by_email.read().unwrap_or_else(|e| e.into_inner());
        map.values()
            .find(|e| e.account.id == id)
            .map(|e| e.account.clone())
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

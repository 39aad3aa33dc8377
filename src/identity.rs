//! `user@host` label stamped into the CA common name and leaf OU.

use std::env;

/// The account running the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    /// Display name from the user database, if any.
    pub full_name: Option<String>,
}

/// Label for the current user on the current machine.
///
/// Either half is dropped when it cannot be determined. The account's display
/// name is appended in parentheses when it differs from the username.
pub fn identity_label() -> String {
    let account = current_account();
    let host = hostname::get()
        .ok()
        .map(|name| name.to_string_lossy().into_owned());
    format_identity(account.as_ref(), host.as_deref())
}

/// Look the account up in the user database, falling back to `USER`/`USERNAME`.
pub fn current_account() -> Option<Account> {
    account_from_user_database().or_else(|| {
        env::var("USER")
            .or_else(|_| env::var("USERNAME"))
            .ok()
            .filter(|name| !name.is_empty())
            .map(|username| Account {
                username,
                full_name: None,
            })
    })
}

#[cfg(unix)]
fn account_from_user_database() -> Option<Account> {
    use nix::unistd::{Uid, User};

    let user = User::from_uid(Uid::current()).ok().flatten()?;
    let gecos = user.gecos.to_string_lossy();
    // GECOS is "Full Name,room,phone,..."; only the first field is the name.
    let full_name = gecos
        .split(',')
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string);
    Some(Account {
        username: user.name,
        full_name,
    })
}

#[cfg(not(unix))]
fn account_from_user_database() -> Option<Account> {
    None
}

pub fn format_identity(account: Option<&Account>, host: Option<&str>) -> String {
    let account = account.filter(|a| !a.username.is_empty());
    let mut label = String::new();
    if let Some(account) = account {
        label.push_str(&account.username);
        label.push('@');
    }
    if let Some(host) = host {
        label.push_str(host);
    }
    if let Some(account) = account {
        if let Some(full_name) = account
            .full_name
            .as_deref()
            .filter(|name| *name != account.username)
        {
            label.push_str(" (");
            label.push_str(full_name);
            label.push(')');
        }
    }
    label
}

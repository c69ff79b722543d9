use crate::api::{BillingCommitter, CommitAuthor};
use std::cmp::Ordering;
use std::collections::btree_map::{self, BTreeMap};
use std::fmt::{Display, Formatter};

/// String used to deduplicate identities: the linked login when there is one, the email otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolvedKey {
    Login(String),
    Email(String),
}

impl ResolvedKey {
    pub fn as_str(&self) -> &str {
        match self {
            ResolvedKey::Login(key) | ResolvedKey::Email(key) => key,
        }
    }

    pub fn is_login(&self) -> bool {
        matches!(self, ResolvedKey::Login(_))
    }
}

// Keys sort by their text so reports list logins and emails interleaved alphabetically.
impl Ord for ResolvedKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str()
            .cmp(other.as_str())
            .then_with(|| other.is_login().cmp(&self.is_login()))
    }
}

impl PartialOrd for ResolvedKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for ResolvedKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display form of a person, built only through [`Identity::resolve`] or an [`EntitlementSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    key: ResolvedKey,
    email: Option<String>,
}

impl Identity {
    /// Resolves a commit author. Authors with neither a login nor an email yield `None`.
    pub fn resolve(author: CommitAuthor) -> Option<(ResolvedKey, Identity)> {
        let email = non_empty(author.email);
        let key = match (non_empty(author.login), &email) {
            (Some(login), _) => ResolvedKey::Login(login),
            (None, Some(email)) => ResolvedKey::Email(email.clone()),
            (None, None) => return None,
        };
        Some((key.clone(), Identity { key, email }))
    }

    pub fn key(&self) -> &ResolvedKey {
        &self.key
    }

    pub fn username(&self) -> Option<&str> {
        match &self.key {
            ResolvedKey::Login(login) => Some(login),
            ResolvedKey::Email(_) => None,
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Deduplicated committers of one repository, or an aggregate of several.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitterSet {
    committers: BTreeMap<ResolvedKey, Identity>,
}

impl CommitterSet {
    /// Adds the author if it resolves. Returns whether it did.
    pub fn insert_author(&mut self, author: CommitAuthor) -> bool {
        match Identity::resolve(author) {
            Some((key, identity)) => {
                self.committers.insert(key, identity);
                true
            }
            None => false,
        }
    }

    /// Copies every entry of `other` into `self`, `other` winning on equal keys.
    pub fn merge(&mut self, other: &CommitterSet) {
        self.committers
            .extend(other.committers.iter().map(|(key, identity)| (key.clone(), identity.clone())));
    }

    pub fn contains(&self, key: &ResolvedKey) -> bool {
        self.committers.contains_key(key)
    }

    pub fn get(&self, key: &ResolvedKey) -> Option<&Identity> {
        self.committers.get(key)
    }

    pub fn keys(&self) -> btree_map::Keys<'_, ResolvedKey, Identity> {
        self.committers.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ResolvedKey, Identity> {
        self.committers.iter()
    }

    pub fn len(&self) -> usize {
        self.committers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.committers.is_empty()
    }
}

impl FromIterator<CommitAuthor> for CommitterSet {
    fn from_iter<I: IntoIterator<Item = CommitAuthor>>(authors: I) -> Self {
        let mut set = CommitterSet::default();
        for author in authors {
            set.insert_author(author);
        }
        set
    }
}

/// Licensed committers keyed by username.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntitlementSet {
    entitled: BTreeMap<String, Identity>,
}

impl EntitlementSet {
    /// Adds a billing breakdown entry. Entries without a login are ignored.
    pub fn insert_committer(&mut self, committer: BillingCommitter) -> bool {
        let login = committer.login.trim();
        if login.is_empty() {
            return false;
        }
        let identity = Identity {
            key: ResolvedKey::Login(login.to_string()),
            email: non_empty(committer.last_pushed_email),
        };
        self.entitled.insert(login.to_string(), identity);
        true
    }

    pub fn contains(&self, username: &str) -> bool {
        self.entitled.contains_key(username)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Identity> {
        self.entitled.iter()
    }

    pub fn len(&self) -> usize {
        self.entitled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entitled.is_empty()
    }
}

impl FromIterator<BillingCommitter> for EntitlementSet {
    fn from_iter<I: IntoIterator<Item = BillingCommitter>>(committers: I) -> Self {
        let mut set = EntitlementSet::default();
        for committer in committers {
            set.insert_committer(committer);
        }
        set
    }
}

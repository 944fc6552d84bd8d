// Copyright (c) 2024 Marc Pabst
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use fontdb::{Database, Family, Query};

/// Returns the first family in `families` that has at least one face in `db`.
pub fn first_available(db: &Database, families: &[impl AsRef<str>]) -> Option<String> {
    families.iter().map(AsRef::as_ref).find_map(|name| {
        let query = Query {
            families: &[Family::Name(name)],
            ..Query::default()
        };
        db.query(&query).map(|_| name.to_string())
    })
}

/// An ordered list of preferred font families. The first one installed on
/// the system is used.
#[derive(Debug)]
pub struct FontPreferences {
    families: Vec<String>,
    db: Option<Database>,
}

impl FontPreferences {
    pub fn new<S: Into<String>>(families: impl IntoIterator<Item = S>) -> Self {
        Self {
            families: families.into_iter().map(Into::into).collect(),
            db: None,
        }
    }

    /// Use `db` instead of the system font database.
    pub fn with_database(mut self, db: Database) -> Self {
        self.db = Some(db);
        self
    }

    pub fn families(&self) -> &[String] {
        &self.families
    }

    /// Resolve the preferred family. System fonts are loaded on first use.
    pub fn resolve(&mut self) -> Option<String> {
        if self.families.is_empty() {
            log::debug!("No preferred fonts given");
            return None;
        }

        let db = self.db.get_or_insert_with(|| {
            let mut db = Database::new();
            db.load_system_fonts();
            log::debug!("Loaded {} system font faces", db.len());
            db
        });

        let found = first_available(db, &self.families);
        match &found {
            Some(name) => log::debug!("Using font {:?}", name),
            None => log::debug!("None of the preferred fonts are installed: {:?}", self.families),
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_database_has_no_match() {
        let db = Database::new();
        assert_eq!(first_available(&db, &["Monotype Corsiva", "Arial"]), None);
    }

    #[test]
    fn empty_list_resolves_to_none() {
        let mut prefs = FontPreferences::new(Vec::<String>::new());
        assert_eq!(prefs.resolve(), None);
    }

    #[test]
    fn resolves_against_given_database() {
        let mut prefs = FontPreferences::new(["Palace Script MT", "Edwardian Script ITC"])
            .with_database(Database::new());
        assert_eq!(prefs.families().len(), 2);
        assert_eq!(prefs.resolve(), None);
    }
}

use anyhow::Result;
use card_core::ServiceCapabilities;
use tokio::sync::RwLock;

use crate::services::contacts::contacts_shared;
use crate::services::{Contact, ContactChanges, ContactParams};

/// In-process stand-in for the mirror table, selected with
/// `DATABASE_URL=memory://`.
pub struct MemoryContacts {
    rows: RwLock<Vec<Contact>>,
    pub capabilities: ServiceCapabilities,
}

impl MemoryContacts {
    pub fn new(rows: Vec<Contact>) -> Self {
        Self {
            rows: RwLock::new(rows),
            capabilities: contacts_shared::capabilities(),
        }
    }

    pub fn demo() -> Self {
        Self::new(demo_contacts())
    }

    pub async fn _find(&self, _params: ContactParams) -> Result<Vec<Contact>> {
        let rows = self.rows.read().await;
        let mut out: Vec<Contact> = rows
            .iter()
            .filter(|c| !c.sfid.is_empty())
            .cloned()
            .collect();
        out.sort_by_key(|c| c.id);
        Ok(out)
    }

    pub async fn _get(&self, sfid: &str, _params: ContactParams) -> Result<Contact> {
        let rows = self.rows.read().await;
        rows.iter()
            .find(|c| c.sfid == sfid)
            .cloned()
            .ok_or_else(|| contacts_shared::not_found(sfid))
    }

    pub async fn _patch(
        &self,
        sfid: &str,
        data: ContactChanges,
        _params: ContactParams,
    ) -> Result<Contact> {
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|c| c.sfid == sfid)
            .ok_or_else(|| contacts_shared::not_found(sfid))?;

        row.apply(data);
        Ok(row.clone())
    }
}

card_core::card_adapter!(MemoryContacts, Contact, ContactParams);

struct Seed<'a> {
    sfid: &'a str,
    first: &'a str,
    last: &'a str,
    title: Option<&'a str>,
    email: &'a str,
    phone: &'a str,
}

impl Seed<'_> {
    fn into_contact(self, id: i32) -> Contact {
        Contact {
            id,
            sfid: self.sfid.to_string(),
            firstname: Some(self.first.to_string()),
            lastname: Some(self.last.to_string()),
            title: self.title.map(str::to_string),
            email: Some(self.email.to_string()),
            phone: Some(self.phone.to_string()),
        }
    }
}

/// Sample rows in the shape of a fresh Salesforce developer org.
pub fn demo_contacts() -> Vec<Contact> {
    let seeds = [
        Seed {
            sfid: "0031U00001WaiGcQAJ",
            first: "Rose",
            last: "Gonzalez",
            title: Some("SVP, Procurement"),
            email: "rose@edge.com",
            phone: "(512) 757-6000",
        },
        Seed {
            sfid: "0031U00001WaiGdQAJ",
            first: "Sean",
            last: "Forbes",
            title: Some("CFO"),
            email: "sean@edge.com",
            phone: "(512) 757-6000",
        },
        Seed {
            sfid: "0031U00001WaiGeQAJ",
            first: "Jack",
            last: "Rogers",
            title: Some("VP, Facilities"),
            email: "jrogers@burlington.com",
            phone: "(336) 222-7000",
        },
        Seed {
            sfid: "0031U00001WaiGfQAJ",
            first: "Pat",
            last: "Stumuller",
            title: Some("SVP, Administration and Finance"),
            email: "pat@pyramid.net",
            phone: "(014) 427-4427",
        },
        Seed {
            sfid: "0031U00001WaiGgQAJ",
            first: "Andy",
            last: "Young",
            title: None,
            email: "a_young@dickenson.com",
            phone: "(785) 241-6200",
        },
    ];

    seeds
        .into_iter()
        .zip(1..)
        .map(|(seed, id)| seed.into_contact(id))
        .collect()
}

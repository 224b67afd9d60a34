use std::fmt::{self, Display};

use super::RecordId;
use crate::db::{FieldReader, FieldWriter, Record};

/// Freight broker that tenders loads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrokerEntry {
    pub id: RecordId,
    pub company: String,
    pub contact: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
}

impl BrokerEntry {
    pub fn new(company: String) -> Self {
        Self {
            id: RecordId::generate(),
            company,
            ..Default::default()
        }
    }
}

impl Record for BrokerEntry {
    const FIELD_COUNT: usize = 10;

    fn encode(&self, fields: &mut FieldWriter) {
        fields
            .number(self.id)
            .text(&self.company)
            .opt_text(self.contact.as_deref())
            .opt_text(self.street.as_deref())
            .opt_text(self.city.as_deref())
            .opt_text(self.state.as_deref())
            .opt_text(self.zip.as_deref())
            .opt_text(self.phone.as_deref())
            .opt_text(self.email.as_deref())
            .opt_text(self.notes.as_deref());
    }

    fn decode(fields: &mut FieldReader<'_>) -> Self {
        Self {
            id: fields.number("id"),
            company: fields.text("company"),
            contact: fields.opt_text("contact"),
            street: fields.opt_text("street"),
            city: fields.opt_text("city"),
            state: fields.opt_text("state"),
            zip: fields.opt_text("zip"),
            phone: fields.opt_text("phone"),
            email: fields.opt_text("email"),
            notes: fields.opt_text("notes"),
        }
    }
}

impl Display for BrokerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.company)?;
        if let (Some(city), Some(state)) = (&self.city, &self.state) {
            write!(f, ", {city} {state}")?;
        }
        if let Some(phone) = &self.phone {
            write!(f, " {phone}")?;
        }
        Ok(())
    }
}

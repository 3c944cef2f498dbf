use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{EmailAddress, TenantId, TenantName, TypeConstraintError, UserName};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Tenant {
    pub id: TenantId,
    pub name: TenantName,
    pub slug: String,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewTenant {
    pub name: TenantName,
    pub slug: String,
}

impl NewTenant {
    /// Builds a tenant with a slug derived from its name.
    pub fn new(name: TenantName) -> Result<Self, TypeConstraintError> {
        let slug = slugify(name.as_str());
        if slug.is_empty() {
            return Err(TypeConstraintError::InvalidValue(format!(
                "cannot derive slug from {name}"
            )));
        }
        Ok(Self { name, slug })
    }

    /// Returns a copy with `-{suffix}` appended to the slug.
    #[must_use]
    pub fn with_suffix(&self, suffix: u32) -> Self {
        Self {
            name: self.name.clone(),
            slug: format!("{}-{suffix}", self.slug),
        }
    }
}

/// First administrator created together with a tenant.
#[derive(Clone, Debug)]
pub struct NewTenantAdmin {
    pub email: EmailAddress,
    pub name: UserName,
    pub password_hash: String,
}

/// Lower-cases and replaces every run of non-alphanumeric characters with `-`.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Acme, Inc.  "), "acme-inc");
        assert_eq!(slugify("1twenty CRM"), "1twenty-crm");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn new_tenant_rejects_unsluggable_names() {
        let name = TenantName::new("***").unwrap();
        assert!(NewTenant::new(name).is_err());

        let tenant = NewTenant::new(TenantName::new("Globex").unwrap()).unwrap();
        assert_eq!(tenant.with_suffix(2).slug, "globex-2");
    }
}

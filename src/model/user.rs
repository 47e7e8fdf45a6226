use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Subscription tier. Decides how many listings a provider may publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Spark,
    Pro,
    Premium,
}

impl Plan {
    pub const ALL: [Plan; 3] = [Plan::Spark, Plan::Pro, Plan::Premium];

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Spark => "spark",
            Plan::Pro => "pro",
            Plan::Premium => "premium",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Plan::Spark => "Spark",
            Plan::Pro => "Pro",
            Plan::Premium => "Premium",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "spark" => Some(Plan::Spark),
            "pro" => Some(Plan::Pro),
            "premium" => Some(Plan::Premium),
            _ => None,
        }
    }

    /// Maximum number of listings, `None` meaning unlimited.
    pub fn listing_limit(&self) -> Option<u64> {
        match self {
            Plan::Spark => Some(1),
            Plan::Pro => Some(10),
            Plan::Premium => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    /// Older documents may lack a plan; they are treated as `spark`.
    #[serde(default)]
    pub plan: Option<Plan>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub profile_photo_url: String,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn effective_plan(&self) -> Plan {
        self.plan.unwrap_or_default()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }
}

/// Fields written by one user update. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub whatsapp: Option<Option<String>>,
    pub profile_photo_url: Option<String>,
    pub password_hash: Option<String>,
    pub email_verified: Option<bool>,
    pub role: Option<Role>,
    pub plan: Option<Plan>,
}

impl UserChanges {
    pub fn apply(&self, user: &mut User, at: DateTime<Utc>) {
        if let Some(name) = &self.name {
            user.name = name.clone();
        }
        if let Some(bio) = &self.bio {
            user.bio = bio.clone();
        }
        if let Some(whatsapp) = &self.whatsapp {
            user.whatsapp = whatsapp.clone();
        }
        if let Some(url) = &self.profile_photo_url {
            user.profile_photo_url = url.clone();
        }
        if let Some(hash) = &self.password_hash {
            user.password_hash = hash.clone();
        }
        if let Some(verified) = self.email_verified {
            user.email_verified = verified;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(plan) = self.plan {
            user.plan = Some(plan);
        }
        user.updated_at = at;
    }

    /// `$set` body touching only the changed fields and `updatedAt`.
    pub fn set_document(&self, at: DateTime<Utc>) -> Result<bson::Document, bson::ser::Error> {
        let mut set = bson::Document::new();
        if let Some(name) = &self.name {
            set.insert("name", name.as_str());
        }
        if let Some(bio) = &self.bio {
            set.insert("bio", bio.as_str());
        }
        if let Some(whatsapp) = &self.whatsapp {
            set.insert("whatsapp", bson::to_bson(whatsapp)?);
        }
        if let Some(url) = &self.profile_photo_url {
            set.insert("profilePhotoUrl", url.as_str());
        }
        if let Some(hash) = &self.password_hash {
            set.insert("passwordHash", hash.as_str());
        }
        if let Some(verified) = self.email_verified {
            set.insert("emailVerified", verified);
        }
        if let Some(role) = self.role {
            set.insert("role", bson::to_bson(&role)?);
        }
        if let Some(plan) = self.plan {
            set.insert("plan", bson::to_bson(&plan)?);
        }
        set.insert("updatedAt", bson::to_bson(&at)?);
        Ok(set)
    }
}

/// Public projection of a user, never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub plan: Plan,
    pub bio: String,
    pub profile_photo_url: String,
    pub whatsapp: Option<String>,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        PublicUser {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            plan: user.effective_plan(),
            bio: user.bio.clone(),
            profile_photo_url: user.profile_photo_url.clone(),
            whatsapp: user.whatsapp.clone(),
            email_verified: user.email_verified,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_touch_only_named_fields() {
        let changes = UserChanges {
            bio: Some("Tailor in Kabale".into()),
            whatsapp: Some(None),
            ..UserChanges::default()
        };
        let set = changes.set_document(Utc::now()).unwrap();
        assert_eq!(set.get_str("bio").unwrap(), "Tailor in Kabale");
        assert!(set.contains_key("whatsapp"));
        assert!(set.contains_key("updatedAt"));
        assert!(!set.contains_key("plan"));
        assert!(!set.contains_key("role"));
        assert!(!set.contains_key("name"));
    }

    #[test]
    fn plan_limits() {
        assert_eq!(Plan::Spark.listing_limit(), Some(1));
        assert_eq!(Plan::Pro.listing_limit(), Some(10));
        assert_eq!(Plan::Premium.listing_limit(), None);
    }

    #[test]
    fn plan_parse_is_case_insensitive() {
        assert_eq!(Plan::parse("Premium"), Some(Plan::Premium));
        assert_eq!(Plan::parse("gold"), None);
    }

    #[test]
    fn missing_plan_deserializes_as_spark() {
        let json = serde_json::json!({
            "_id": "u1",
            "name": "Amina Nakato",
            "email": "amina@example.com",
            "passwordHash": "x",
            "createdAt": "2025-01-01T00:00:00Z",
            "updatedAt": "2025-01-01T00:00:00Z"
        });
        let user: User = serde_json::from_value(json).unwrap();
        assert_eq!(user.plan, None);
        assert_eq!(user.effective_plan(), Plan::Spark);
        assert_eq!(user.role, Role::User);
        assert_eq!(user.first_name(), "Amina");
    }
}

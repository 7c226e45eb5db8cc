//! Customer accounts: users and their extended profiles.

use once_cell::sync::Lazy;

use backoffice_admin::autodiscover::AdminApp;
use backoffice_admin::model_admin::{factory, ModelAdmin};
use backoffice_admin::site::AdminSite;
use backoffice_core::apps::AppConfig;
use backoffice_core::error::BackofficeResult;
use backoffice_core::meta::{FieldDef, FieldType, ModelMeta, OnDelete};

static USER: Lazy<ModelMeta> = Lazy::new(|| {
    ModelMeta::new("accounts", "User")
        .ordering(vec!["-date_joined"])
        .fields(vec![
            FieldDef::new("id", FieldType::BigAutoField).primary_key(),
            FieldDef::new("username", FieldType::CharField).max_length(150).unique(),
            FieldDef::new("email", FieldType::EmailField).max_length(254).blank(),
            FieldDef::new("first_name", FieldType::CharField).max_length(150).blank(),
            FieldDef::new("last_name", FieldType::CharField).max_length(150).blank(),
            FieldDef::new("is_staff", FieldType::BooleanField),
            FieldDef::new("is_active", FieldType::BooleanField),
            FieldDef::new("date_joined", FieldType::DateTimeField),
        ])
});

static USER_PROFILE: Lazy<ModelMeta> = Lazy::new(|| {
    ModelMeta::new("accounts", "UserProfile")
        .verbose_name("user profile")
        .verbose_name_plural("user profiles")
        .fields(vec![
            FieldDef::new("id", FieldType::BigAutoField).primary_key(),
            FieldDef::new(
                "user",
                FieldType::OneToOneField {
                    to: "accounts.user".to_string(),
                    on_delete: OnDelete::Cascade,
                    related_name: Some("profile".to_string()),
                },
            ),
            FieldDef::new("phone", FieldType::CharField).max_length(20).blank().null(),
            FieldDef::new("address", FieldType::TextField).blank().null(),
            FieldDef::new("city", FieldType::CharField).max_length(100).blank().null(),
            FieldDef::new("postal_code", FieldType::CharField).max_length(10).blank().null(),
            FieldDef::new("country", FieldType::CharField).max_length(100).blank().null(),
            FieldDef::new("birth_date", FieldType::DateField).blank().null(),
            FieldDef::new("is_premium", FieldType::BooleanField),
            FieldDef::new("newsletter_subscribed", FieldType::BooleanField),
            FieldDef::new("created_at", FieldType::DateTimeField),
            FieldDef::new("updated_at", FieldType::DateTimeField),
        ])
});

/// Metadata of the user model.
pub fn user_meta() -> &'static ModelMeta {
    &USER
}

/// Metadata of the user profile model.
pub fn user_profile_meta() -> &'static ModelMeta {
    &USER_PROFILE
}

fn user_admin() -> ModelAdmin {
    ModelAdmin::new("accounts", "user")
        .list_display(vec!["username", "email", "first_name", "last_name", "is_staff"])
        .search_fields(vec!["username", "email", "first_name", "last_name"])
        .list_filter(vec!["is_staff", "is_active"])
        .ordering(vec!["-date_joined"])
        .schema_from(&USER)
}

fn user_profile_admin() -> ModelAdmin {
    ModelAdmin::new("accounts", "userprofile")
        .verbose_name("user profile")
        .verbose_name_plural("user profiles")
        .list_display(vec![
            "user",
            "phone",
            "city",
            "country",
            "is_premium",
            "newsletter_subscribed",
            "created_at",
        ])
        .search_fields(vec!["user__username", "user__email", "phone", "city", "country"])
        .list_filter(vec!["is_premium", "newsletter_subscribed", "country"])
        .readonly_fields(vec!["created_at", "updated_at"])
        .schema_from(&USER_PROFILE)
}

/// The accounts application.
pub struct AccountsApp;

impl AppConfig for AccountsApp {
    fn name(&self) -> &str {
        "accounts"
    }

    fn verbose_name(&self) -> &str {
        "Customer Accounts"
    }

    fn models(&self) -> Vec<&'static ModelMeta> {
        vec![&*USER, &*USER_PROFILE]
    }
}

impl AdminApp for AccountsApp {
    fn register_admins(&self, site: &mut AdminSite) -> BackofficeResult<()> {
        site.register(&USER, factory(user_admin))?;
        site.register(&USER_PROFILE, factory(user_profile_admin))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_declares_models() {
        let app = AccountsApp;
        assert_eq!(app.label(), "accounts");
        assert_eq!(app.models().len(), 2);
        assert_eq!(user_meta().key(), "accounts.user");
        assert_eq!(user_profile_meta().key(), "accounts.userprofile");
    }

    #[test]
    fn test_register_admins() {
        let mut site = AdminSite::new("admin");
        AccountsApp.register_admins(&mut site).unwrap();
        assert!(site.is_registered("accounts.user"));
        let profile = site.get_model_admin("accounts.userprofile").unwrap();
        assert!(profile.search_fields.contains(&"user__username".to_string()));
    }

    #[test]
    fn test_user_date_field() {
        assert_eq!(user_meta().date_field(), Some("date_joined"));
        assert_eq!(user_profile_meta().date_field(), Some("created_at"));
    }
}

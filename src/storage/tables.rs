use redb::TableDefinition;

/// Media items: uuid -> MediaItem (msgpack)
pub const MEDIA_ITEMS: TableDefinition<&str, &[u8]> = TableDefinition::new("media_items");

/// Contact form entries: uuid -> ContactSubmission (msgpack)
pub const CONTACT_SUBMISSIONS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("contact_submissions");

/// Company profile: uuid -> CompanyProfile (msgpack). Only the first row is canonical.
pub const COMPANY_PROFILES: TableDefinition<&str, &[u8]> = TableDefinition::new("company_profiles");

/// Admin allow-list: identity provider uid -> AdminGrant (msgpack)
pub const ADMIN_GRANTS: TableDefinition<&str, &[u8]> = TableDefinition::new("admin_grants");

pub(super) const DASHBOARD_PANEL: &str = "[data-admin-panel=\"dashboard\"]";
pub(super) const BLOGS_PANEL: &str = "[data-admin-panel=\"blogs\"]";
pub(super) const BLOG_EDITOR_PANEL: &str = "[data-admin-panel=\"blog-editor\"]";
pub(super) const CONTACTS_PANEL: &str = "[data-admin-panel=\"contacts\"]";
pub(super) const TOAST_STACK: &str = "[data-admin-toast=\"stack\"]";

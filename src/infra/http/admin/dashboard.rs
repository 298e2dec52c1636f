use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use super::{
    selectors::DASHBOARD_PANEL,
    shared::{admin_chrome, page_response},
};
use crate::application::stream::replace_event;
use crate::domain::types::Table;
use crate::infra::http::{AdminSession, RouterState, live::live_view};
use crate::presentation::{
    admin::views::{
        AdminDashboardPanelTemplate, AdminDashboardTemplate, AdminSection, DashboardPanelView,
    },
    views::render_fragment,
};

pub(super) async fn admin_dashboard(
    State(state): State<RouterState>,
    Extension(session): Extension<AdminSession>,
    jar: CookieJar,
) -> Response {
    let overview = state.app.dashboard.overview().await;
    let (jar, chrome) = admin_chrome(jar, &session, AdminSection::Dashboard, "Dashboard");
    page_response(
        jar,
        AdminDashboardTemplate {
            chrome,
            panel: DashboardPanelView::from(&overview),
        },
        StatusCode::OK,
    )
}

pub(super) async fn admin_dashboard_live(
    State(state): State<RouterState>,
    Extension(session): Extension<AdminSession>,
) -> Response {
    live_view(
        &state,
        &Table::ALL,
        Some(session),
        |app| async move {
            let overview = app.dashboard.overview().await;
            let panel = AdminDashboardPanelTemplate {
                panel: DashboardPanelView::from(&overview),
            };
            let html = render_fragment(&panel, "infra::http::admin::dashboard_live")?;
            Ok(replace_event(DASHBOARD_PANEL, html))
        },
    )
}

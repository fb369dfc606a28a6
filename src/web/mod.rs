//! Web API module for Stagecard.
//!
//! REST access to one workflow template: stages and their tools, stage card
//! layouts and balloon catalogs. Every mutation is written back to the
//! template file (or the layout store) before the response is sent.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /api/tools` - Tool catalog
//! - `GET /api/stages` - List stages
//! - `GET|PATCH /api/stages/{id}` - Read or edit a stage
//! - `PUT|DELETE /api/stages/{id}/tools/{tool}` - Enable or disable a tool
//! - `GET|PUT|DELETE /api/stages/{id}/layout` - Read, replace or reset a layout
//! - `PUT /api/stages/{id}/layout/mode` - Switch the column arrangement
//! - `GET|POST /api/stages/{id}/catalogs/{area}` - List or add balloons
//! - `PATCH|DELETE /api/stages/{id}/catalogs/{area}/{item}` - Edit or remove a balloon
//! - `PUT /api/stages/{id}/catalogs/{area}/order` - Reorder a catalog

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::editor::{BalloonManager, EditError, StageWorkspace};
use crate::models::{
    BalloonArea, BalloonColor, BalloonIcon, BalloonItem, LayoutMode, ModelStage, StageLayout,
    StagePatch, StageStatus, ToolKind, WorkflowTemplate,
};
use crate::services::{CatalogError, LayoutRepository, TemplateService};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the web API.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    config: Arc<Config>,
    /// The template being served
    template: Arc<RwLock<WorkflowTemplate>>,
    /// Persisted stage layouts
    layouts: Arc<Mutex<LayoutRepository>>,
    /// File the template is written back to
    template_path: PathBuf,
}

impl AppState {
    /// Creates the state, loading `template_path` or starting from the
    /// sample workflow when the file does not exist yet.
    pub fn new(
        config: Config,
        template_path: PathBuf,
        layouts: LayoutRepository,
    ) -> anyhow::Result<Self> {
        let template = if template_path.exists() {
            TemplateService::load(&template_path)?
        } else {
            WorkflowTemplate::sample()
        };
        Ok(Self {
            config: Arc::new(config),
            template: Arc::new(RwLock::new(template)),
            layouts: Arc::new(Mutex::new(layouts)),
            template_path,
        })
    }

    /// Returns the template file path.
    #[must_use]
    pub const fn template_path(&self) -> &PathBuf {
        &self.template_path
    }

    fn persist(&self, template: &WorkflowTemplate) -> ApiResult<()> {
        TemplateService::save(template, &self.template_path)
            .map_err(|e| internal("Failed to save template", &e))
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// One entry of the tool catalog.
#[derive(Debug, Serialize)]
pub struct ToolInfo {
    /// Tool identifier.
    pub id: ToolKind,
    /// Card title.
    pub title: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Header glyph.
    pub icon: &'static str,
}

/// Stage row of the stage list.
#[derive(Debug, Serialize)]
pub struct StageSummary {
    /// Stage id.
    pub id: String,
    /// Stage title.
    pub title: String,
    /// Responsible department.
    pub department: String,
    /// SLA in days.
    pub days: u32,
    /// Progress status.
    pub status: StageStatus,
    /// Enabled tools in order.
    pub tools: Vec<ToolKind>,
}

impl From<&ModelStage> for StageSummary {
    fn from(stage: &ModelStage) -> Self {
        Self {
            id: stage.id.clone(),
            title: stage.title.clone(),
            department: stage.department.clone(),
            days: stage.days,
            status: stage.status,
            tools: stage.tools_order.clone(),
        }
    }
}

/// Stage list response.
#[derive(Debug, Serialize)]
pub struct StageListResponse {
    /// Template name.
    pub template: String,
    /// Stages in order.
    pub stages: Vec<StageSummary>,
}

/// Result of enabling or disabling a tool.
#[derive(Debug, Serialize)]
pub struct ToolToggleResponse {
    /// Stage id.
    pub stage: String,
    /// Tools whose state changed, cascades included.
    pub affected: Vec<ToolKind>,
    /// Enabled tools after the change.
    pub tools: Vec<ToolKind>,
}

/// Layout of a stage.
#[derive(Debug, Serialize)]
pub struct LayoutResponse {
    /// Stage id.
    pub stage: String,
    /// Whether a layout is stored (false means defaults).
    pub stored: bool,
    /// Effective layout.
    pub layout: StageLayout,
}

/// Body of `PUT /api/stages/{id}/layout/mode`.
#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    /// New column arrangement.
    pub mode: LayoutMode,
}

/// Balloons of one catalog.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    /// Stage id.
    pub stage: String,
    /// Catalog area.
    pub area: BalloonArea,
    /// Balloons in order.
    pub items: Vec<BalloonItem>,
}

/// Body of `POST /api/stages/{id}/catalogs/{area}`.
#[derive(Debug, Deserialize)]
pub struct NewBalloonRequest {
    /// Label.
    pub label: String,
    /// Palette color.
    #[serde(default)]
    pub color: Option<BalloonColor>,
    /// Icon.
    #[serde(default)]
    pub icon: Option<BalloonIcon>,
}

/// Body of `PATCH /api/stages/{id}/catalogs/{area}/{item}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBalloonRequest {
    /// New label.
    #[serde(default)]
    pub label: Option<String>,
    /// New palette color.
    #[serde(default)]
    pub color: Option<BalloonColor>,
    /// New icon.
    #[serde(default)]
    pub icon: Option<BalloonIcon>,
    /// Removes the icon.
    #[serde(default)]
    pub clear_icon: bool,
}

/// Body of `PUT /api/stages/{id}/catalogs/{area}/order`.
#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    /// Every balloon id of the catalog, in the new order.
    pub ids: Vec<String>,
}

/// API error response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Error message.
    pub error: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(ApiError::new(message)))
}

fn not_found(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (StatusCode::NOT_FOUND, Json(ApiError::new(message)))
}

fn internal(message: &str, err: &anyhow::Error) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::with_details(message, format!("{err:#}"))),
    )
}

fn catalog_error(err: CatalogError) -> (StatusCode, Json<ApiError>) {
    match err {
        CatalogError::UnknownCatalog { .. } | CatalogError::ItemNotFound(_) => {
            not_found(err.to_string())
        }
        _ => bad_request(err.to_string()),
    }
}

fn edit_error(err: EditError) -> (StatusCode, Json<ApiError>) {
    match err {
        EditError::Label(e) => bad_request(e.to_string()),
        EditError::Catalog(e) => catalog_error(e),
    }
}

fn stage_ref<'a>(template: &'a WorkflowTemplate, id: &str) -> ApiResult<&'a ModelStage> {
    template
        .stage(id)
        .ok_or_else(|| not_found(format!("Stage not found: {id}")))
}

fn parse_tool(id: &str) -> ApiResult<ToolKind> {
    ToolKind::parse(id).ok_or_else(|| not_found(format!("Unknown tool: {id}")))
}

fn parse_area(name: &str) -> ApiResult<BalloonArea> {
    name.parse::<BalloonArea>().map_err(not_found)
}

fn catalog_items(
    template: &WorkflowTemplate,
    stage_id: &str,
    area: BalloonArea,
) -> ApiResult<Vec<BalloonItem>> {
    template
        .catalogs
        .catalog(stage_id, area)
        .map(<[BalloonItem]>::to_vec)
        .map_err(catalog_error)
}

fn find_item(
    template: &WorkflowTemplate,
    stage_id: &str,
    area: BalloonArea,
    item_id: &str,
) -> ApiResult<BalloonItem> {
    catalog_items(template, stage_id, area)?
        .into_iter()
        .find(|item| item.id == item_id)
        .ok_or_else(|| not_found(format!("Balloon not found: {item_id}")))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /health - Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/tools - Tool catalog in canonical order.
async fn list_tools() -> Json<Vec<ToolInfo>> {
    let tools = ToolKind::all()
        .iter()
        .map(|tool| {
            let meta = tool.meta();
            ToolInfo {
                id: *tool,
                title: meta.title,
                description: meta.description,
                icon: meta.icon,
            }
        })
        .collect();
    Json(tools)
}

/// GET /api/stages - List stages.
async fn list_stages(State(state): State<AppState>) -> Json<StageListResponse> {
    let template = state.template.read().await;
    Json(StageListResponse {
        template: template.name.clone(),
        stages: template.stages.iter().map(StageSummary::from).collect(),
    })
}

/// GET /api/stages/{id} - Full stage including tool configuration.
async fn get_stage(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ModelStage>> {
    let template = state.template.read().await;
    Ok(Json(stage_ref(&template, &id)?.clone()))
}

/// PATCH /api/stages/{id} - Edit title, department, days or status.
async fn patch_stage(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<StagePatch>,
) -> ApiResult<Json<ModelStage>> {
    if patch.is_empty() {
        return Err(bad_request("Patch changes nothing"));
    }
    if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(bad_request("Title cannot be empty"));
    }

    let mut template = state.template.write().await;
    let mut layouts = state.layouts.lock().await;
    let stage = stage_ref(&template, &id)?;

    let mut workspace = StageWorkspace::open(stage, &layouts, state.config.tool_dependencies());
    if workspace.apply_patch(&patch) {
        workspace
            .save(&mut *template, &mut layouts)
            .map_err(|e| internal("Failed to save stage", &e))?;
        state.persist(&template)?;
        info!(stage_id = %id, "stage patched");
    }
    Ok(Json(workspace.stage().clone()))
}

async fn toggle_tool(
    state: &AppState,
    id: &str,
    tool: &str,
    enable: bool,
) -> ApiResult<Json<ToolToggleResponse>> {
    let tool = parse_tool(tool)?;
    let mut template = state.template.write().await;
    let mut layouts = state.layouts.lock().await;
    let stage = stage_ref(&template, id)?;

    let mut workspace = StageWorkspace::open(stage, &layouts, state.config.tool_dependencies());
    let affected = if enable {
        workspace.enable_tool(tool)
    } else {
        workspace.disable_tool(tool)
    };
    if workspace.has_changes() {
        workspace
            .save(&mut *template, &mut layouts)
            .map_err(|e| internal("Failed to save stage", &e))?;
        state.persist(&template)?;
        info!(stage_id = %id, tool = tool.id(), enable, ?affected, "tools toggled");
    }

    Ok(Json(ToolToggleResponse {
        stage: id.to_string(),
        affected,
        tools: workspace.stage().tools_order.clone(),
    }))
}

/// PUT /api/stages/{id}/tools/{tool} - Enable a tool and its requirements.
async fn enable_tool(
    State(state): State<AppState>,
    Path((id, tool)): Path<(String, String)>,
) -> ApiResult<Json<ToolToggleResponse>> {
    toggle_tool(&state, &id, &tool, true).await
}

/// DELETE /api/stages/{id}/tools/{tool} - Disable a tool and its dependents.
async fn disable_tool(
    State(state): State<AppState>,
    Path((id, tool)): Path<(String, String)>,
) -> ApiResult<Json<ToolToggleResponse>> {
    toggle_tool(&state, &id, &tool, false).await
}

/// GET /api/stages/{id}/layout - Effective layout.
async fn get_layout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<LayoutResponse>> {
    let template = state.template.read().await;
    let layouts = state.layouts.lock().await;
    let stage = stage_ref(&template, &id)?;

    let stored = layouts
        .exists(&id)
        .map_err(|e| internal("Failed to read layout", &e))?;
    Ok(Json(LayoutResponse {
        stage: id,
        stored,
        layout: layouts.load(stage),
    }))
}

/// PUT /api/stages/{id}/layout - Replace the layout.
///
/// The body is reconciled with the stage's enabled tools before it is
/// stored, so unknown or disabled tools are dropped and missing ones appended.
async fn put_layout(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut layout): Json<StageLayout>,
) -> ApiResult<Json<LayoutResponse>> {
    let template = state.template.read().await;
    let mut layouts = state.layouts.lock().await;
    let stage = stage_ref(&template, &id)?;

    layout.set_scale(layout.scale);
    layout.reconcile(&stage.tools_order);
    layouts
        .save(&id, &layout)
        .map_err(|e| internal("Failed to save layout", &e))?;
    info!(stage_id = %id, mode = %layout.mode, "layout replaced");

    Ok(Json(LayoutResponse {
        stage: id,
        stored: true,
        layout,
    }))
}

/// DELETE /api/stages/{id}/layout - Reset to the default layout.
async fn delete_layout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let template = state.template.read().await;
    let mut layouts = state.layouts.lock().await;
    stage_ref(&template, &id)?;

    layouts
        .reset(&id)
        .map_err(|e| internal("Failed to reset layout", &e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/stages/{id}/layout/mode - Switch the column arrangement.
async fn put_layout_mode(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ModeRequest>,
) -> ApiResult<Json<LayoutResponse>> {
    let template = state.template.read().await;
    let mut layouts = state.layouts.lock().await;
    let stage = stage_ref(&template, &id)?;

    let mut layout = layouts.load(stage);
    if layout.set_mode(request.mode) {
        layouts
            .save(&id, &layout)
            .map_err(|e| internal("Failed to save layout", &e))?;
        info!(stage_id = %id, mode = %request.mode, "layout mode changed");
    }
    let stored = layouts
        .exists(&id)
        .map_err(|e| internal("Failed to read layout", &e))?;
    Ok(Json(LayoutResponse {
        stage: id,
        stored,
        layout,
    }))
}

/// GET /api/stages/{id}/catalogs/{area} - Balloons of a catalog.
async fn get_catalog(
    State(state): State<AppState>,
    Path((id, area)): Path<(String, String)>,
) -> ApiResult<Json<CatalogResponse>> {
    let area = parse_area(&area)?;
    let template = state.template.read().await;
    stage_ref(&template, &id)?;

    let items = catalog_items(&template, &id, area)?;
    Ok(Json(CatalogResponse {
        stage: id,
        area,
        items,
    }))
}

/// POST /api/stages/{id}/catalogs/{area} - Append a balloon.
async fn add_balloon(
    State(state): State<AppState>,
    Path((id, area)): Path<(String, String)>,
    Json(request): Json<NewBalloonRequest>,
) -> ApiResult<(StatusCode, Json<BalloonItem>)> {
    let area = parse_area(&area)?;
    let mut template = state.template.write().await;
    stage_ref(&template, &id)?;

    let mut manager = BalloonManager::new(id.as_str(), area);
    let item_id = manager
        .add(&mut template.catalogs, &request.label)
        .map_err(edit_error)?;
    if let Some(color) = request.color {
        template
            .catalogs
            .set_balloon_color(&id, area, &item_id, color)
            .map_err(catalog_error)?;
    }
    if request.icon.is_some() {
        template
            .catalogs
            .set_balloon_icon(&id, area, &item_id, request.icon)
            .map_err(catalog_error)?;
    }
    state.persist(&template)?;
    info!(stage_id = %id, area = area.name(), item_id = %item_id, "balloon added");

    let item = find_item(&template, &id, area, &item_id)?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PATCH /api/stages/{id}/catalogs/{area}/{item} - Rename or restyle.
async fn update_balloon(
    State(state): State<AppState>,
    Path((id, area, item_id)): Path<(String, String, String)>,
    Json(request): Json<UpdateBalloonRequest>,
) -> ApiResult<Json<BalloonItem>> {
    let area = parse_area(&area)?;
    if request.icon.is_some() && request.clear_icon {
        return Err(bad_request("icon and clear_icon are mutually exclusive"));
    }
    let mut template = state.template.write().await;
    stage_ref(&template, &id)?;
    find_item(&template, &id, area, &item_id)?;

    if let Some(label) = &request.label {
        BalloonManager::new(id.as_str(), area)
            .rename(&mut template.catalogs, &item_id, label)
            .map_err(edit_error)?;
    }
    if let Some(color) = request.color {
        template
            .catalogs
            .set_balloon_color(&id, area, &item_id, color)
            .map_err(catalog_error)?;
    }
    if request.icon.is_some() || request.clear_icon {
        template
            .catalogs
            .set_balloon_icon(&id, area, &item_id, request.icon)
            .map_err(catalog_error)?;
    }
    state.persist(&template)?;

    Ok(Json(find_item(&template, &id, area, &item_id)?))
}

/// DELETE /api/stages/{id}/catalogs/{area}/{item} - Remove a balloon.
///
/// Removing an id that is not in the catalog succeeds without changes.
async fn delete_balloon(
    State(state): State<AppState>,
    Path((id, area, item_id)): Path<(String, String, String)>,
) -> ApiResult<StatusCode> {
    let area = parse_area(&area)?;
    let mut template = state.template.write().await;
    stage_ref(&template, &id)?;

    let removed = template
        .catalogs
        .remove_balloon(&id, area, &item_id)
        .map_err(catalog_error)?;
    if removed.is_some() {
        state.persist(&template)?;
        info!(stage_id = %id, area = area.name(), item_id = %item_id, "balloon removed");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/stages/{id}/catalogs/{area}/order - Reorder a catalog.
async fn reorder_catalog(
    State(state): State<AppState>,
    Path((id, area)): Path<(String, String)>,
    Json(request): Json<OrderRequest>,
) -> ApiResult<Json<CatalogResponse>> {
    let area = parse_area(&area)?;
    let mut template = state.template.write().await;
    stage_ref(&template, &id)?;

    template
        .catalogs
        .reorder_balloons(&id, area, &request.ids)
        .map_err(catalog_error)?;
    state.persist(&template)?;

    let items = catalog_items(&template, &id, area)?;
    Ok(Json(CatalogResponse {
        stage: id,
        area,
        items,
    }))
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    // The server is meant to run next to a local frontend.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/tools", get(list_tools))
        // Stage endpoints
        .route("/api/stages", get(list_stages))
        .route("/api/stages/{id}", get(get_stage).patch(patch_stage))
        .route(
            "/api/stages/{id}/tools/{tool}",
            put(enable_tool).delete(disable_tool),
        )
        // Layout endpoints
        .route(
            "/api/stages/{id}/layout",
            get(get_layout).put(put_layout).delete(delete_layout),
        )
        .route("/api/stages/{id}/layout/mode", put(put_layout_mode))
        // Catalog endpoints
        .route(
            "/api/stages/{id}/catalogs/{area}",
            get(get_catalog).post(add_balloon),
        )
        .route(
            "/api/stages/{id}/catalogs/{area}/order",
            put(reorder_catalog),
        )
        .route(
            "/api/stages/{id}/catalogs/{area}/{item}",
            axum::routing::patch(update_balloon).delete(delete_balloon),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs the web server.
///
/// # Errors
///
/// Returns an error if the template cannot be loaded or the server fails to
/// start.
pub async fn run_server(
    config: Config,
    template_path: PathBuf,
    layouts: LayoutRepository,
    addr: SocketAddr,
) -> anyhow::Result<()> {
    let state = AppState::new(config, template_path, layouts)?;
    info!(template = %state.template_path.display(), "Starting Stagecard web server on {}", addr);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_area_accepts_name_and_path() {
        assert_eq!(
            parse_area("checklist_catalog").ok(),
            Some(BalloonArea::ChecklistCatalog)
        );
        assert_eq!(
            parse_area("main_form.required_fields").ok(),
            Some(BalloonArea::RequiredFields)
        );
        let (status, _) = parse_area("nope").unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_edit_error_status() {
        let (status, _) = edit_error(EditError::Label(crate::models::LabelError::Empty));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = edit_error(EditError::Catalog(CatalogError::ItemNotFound("x".into())));
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

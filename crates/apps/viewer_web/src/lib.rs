use console_error_panic_hook::set_once;
use gloo_net::http::Request;
use std::cell::RefCell;
use std::sync::Arc;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlElement, HtmlImageElement, HtmlInputElement, HtmlSelectElement};

use foundation::time::TimeIndex;
use formats::{ManifestDocument, ManifestIndex};
use runtime::{ActivateTarget, EventBus, ViewerEvent};
use session::{Session, ViewModel, elevation_label, run_label};

/// Element ids the page must provide.
mod ids {
    pub const HEADING: &str = "singleRunHeading";
    pub const RUN: &str = "runSelect";
    pub const CONVERSION: &str = "convSelect";
    pub const VARIABLE: &str = "varSelect";
    pub const ELEVATION: &str = "elevSelect";
    pub const TIME_RANGE: &str = "timeRange";
    pub const TIME_LABEL: &str = "timeLabel";
    pub const PLOT: &str = "plot";
    pub const GRID_COUNT: &str = "gridCount";
    pub const GRID_PICKERS: &str = "gridSelectContainer";
    pub const GRID: &str = "comparisonGrid";
    pub const MODAL: &str = "imageModal";
    pub const MODAL_IMG: &str = "modalImg";
}

/// Attribute carrying the 0-based column on grid images and run pickers.
const COLUMN_ATTR: &str = "data-column";

struct ViewerApp {
    session: Session,
    bus: EventBus,
    /// Prefix joined to every image reference before it becomes a `src`.
    image_base: String,
    /// Picker values currently in the DOM; pickers are rebuilt when these differ.
    rendered_pickers: Vec<String>,
}

thread_local! {
    static STATE: RefCell<Option<ViewerApp>> = const { RefCell::new(None) };
}

fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    set_once();
    Ok(())
}

/// Fetches the manifest, builds the session and paints the first frame.
///
/// A failed fetch or parse leaves the page unwired.
#[wasm_bindgen]
pub fn start_viewer(manifest_url: String, image_base: String) {
    spawn_local(async move {
        let document = match fetch_manifest(&manifest_url).await {
            Ok(d) => d,
            Err(err) => {
                let msg = format!("Failed to load manifest {manifest_url}: {:?}", err);
                web_sys::console::error_1(&JsValue::from_str(&msg));
                return;
            }
        };

        let index = ManifestIndex::new(document);
        for issue in index.issues() {
            log(&format!("manifest: {issue}"));
        }
        let session = Session::new(Arc::new(index));

        if let Err(err) = populate_static_options(session.index()) {
            web_sys::console::error_1(&err);
            return;
        }

        STATE.with(|state| {
            *state.borrow_mut() = Some(ViewerApp {
                session,
                bus: EventBus::new(),
                image_base,
                rendered_pickers: Vec::new(),
            });
        });

        if let Err(err) = flush() {
            web_sys::console::error_1(&err);
        }
    });
}

#[wasm_bindgen]
pub fn select_run(run: &str) -> Result<(), JsValue> {
    dispatch(ViewerEvent::RunChanged(run.to_string()))
}

#[wasm_bindgen]
pub fn select_conversion(conversion: &str) -> Result<(), JsValue> {
    dispatch(ViewerEvent::ConversionChanged(conversion.to_string()))
}

#[wasm_bindgen]
pub fn select_variable(variable: &str) -> Result<(), JsValue> {
    dispatch(ViewerEvent::VariableChanged(variable.to_string()))
}

#[wasm_bindgen]
pub fn select_elevation(elevation: &str) -> Result<(), JsValue> {
    dispatch(ViewerEvent::ElevationChanged(elevation.to_string()))
}

/// `step` is the 1-based slider value.
#[wasm_bindgen]
pub fn set_time_step(step: u32) -> Result<(), JsValue> {
    dispatch(ViewerEvent::TimeChanged(TimeIndex::from_ui_step(step as usize)))
}

/// Non-numeric or empty grid input arrives as 0 and is treated as 1.
#[wasm_bindgen]
pub fn set_grid_size(columns: u32) -> Result<(), JsValue> {
    dispatch(ViewerEvent::GridSizeChanged(columns as usize))
}

#[wasm_bindgen]
pub fn select_column_run(column: u32, run: &str) -> Result<(), JsValue> {
    dispatch(ViewerEvent::ColumnRunChanged {
        column: column as usize,
        run: run.to_string(),
    })
}

#[wasm_bindgen]
pub fn activate_single_view() -> Result<(), JsValue> {
    dispatch(ViewerEvent::Activate(ActivateTarget::SingleView))
}

#[wasm_bindgen]
pub fn activate_column(column: u32) -> Result<(), JsValue> {
    dispatch(ViewerEvent::Activate(ActivateTarget::Column(column as usize)))
}

/// Pointer position in client pixels.
#[wasm_bindgen]
pub fn viewer_pointer_down(x_px: f64, y_px: f64) -> Result<(), JsValue> {
    dispatch(ViewerEvent::PointerDown { x: x_px, y: y_px })
}

#[wasm_bindgen]
pub fn viewer_pointer_move(x_px: f64, y_px: f64) -> Result<(), JsValue> {
    dispatch(ViewerEvent::PointerMove { x: x_px, y: y_px })
}

#[wasm_bindgen]
pub fn viewer_pointer_up() -> Result<(), JsValue> {
    dispatch(ViewerEvent::PointerUp)
}

#[wasm_bindgen]
pub fn viewer_pointer_leave() -> Result<(), JsValue> {
    dispatch(ViewerEvent::PointerLeave)
}

/// Intended usage: call with wheel deltaY. Only the sign is used.
#[wasm_bindgen]
pub fn viewer_wheel(delta_y: f64) -> Result<(), JsValue> {
    dispatch(ViewerEvent::Wheel { delta_y })
}

#[wasm_bindgen]
pub fn viewer_backdrop_click() -> Result<(), JsValue> {
    dispatch(ViewerEvent::BackdropClicked)
}

#[wasm_bindgen]
pub fn viewer_close() -> Result<(), JsValue> {
    dispatch(ViewerEvent::CloseRequested)
}

/// Queues `event` and applies everything pending, then repaints.
/// Events arriving before the manifest is loaded are dropped.
fn dispatch(event: ViewerEvent) -> Result<(), JsValue> {
    let queued = STATE.with(|state| match state.borrow_mut().as_mut() {
        Some(app) => {
            app.bus.emit(event);
            true
        }
        None => false,
    });
    if !queued {
        return Ok(());
    }
    flush()
}

fn flush() -> Result<(), JsValue> {
    STATE.with(|state| {
        let mut state = state.borrow_mut();
        let Some(app) = state.as_mut() else {
            return Ok(());
        };
        // Pointer and wheel traffic only repaints the modal.
        let viewer_only = !app.bus.is_empty()
            && app.bus.events().iter().all(|e| e.event.is_viewer_input());
        app.session.apply_all(&mut app.bus);
        let vm = app.session.view_model();
        if viewer_only {
            render_modal(app, &document()?, &vm)
        } else {
            render(app, &vm)
        }
    })
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("#{id} has an unexpected element type")))
}

fn fill_select<'a>(
    document: &Document,
    select: &HtmlSelectElement,
    options: impl IntoIterator<Item = (&'a str, String)>,
) -> Result<(), JsValue> {
    select.set_inner_html("");
    for (value, label) in options {
        let option = document.create_element("option")?;
        option.set_attribute("value", value)?;
        option.set_text_content(Some(&label));
        select.append_child(&option)?;
    }
    Ok(())
}

/// Run, conversion and variable options never change after load.
fn populate_static_options(index: &ManifestIndex) -> Result<(), JsValue> {
    let document = document()?;
    let runs: HtmlSelectElement = element(&document, ids::RUN)?;
    fill_select(
        &document,
        &runs,
        index.runs().iter().map(|r| (r.as_str(), run_label(r))),
    )?;
    let conversions: HtmlSelectElement = element(&document, ids::CONVERSION)?;
    fill_select(
        &document,
        &conversions,
        index.conversions().iter().map(|c| (c.as_str(), c.clone())),
    )?;
    let variables: HtmlSelectElement = element(&document, ids::VARIABLE)?;
    fill_select(
        &document,
        &variables,
        index.variables().iter().map(|v| (v.as_str(), v.clone())),
    )?;
    Ok(())
}

fn image_src(base: &str, image_ref: &str) -> String {
    if base.is_empty() || image_ref.starts_with('/') || image_ref.contains("://") {
        image_ref.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), image_ref)
    }
}

fn render(app: &mut ViewerApp, vm: &ViewModel) -> Result<(), JsValue> {
    let document = document()?;

    let run: HtmlSelectElement = element(&document, ids::RUN)?;
    run.set_value(&vm.run);
    let conversion: HtmlSelectElement = element(&document, ids::CONVERSION)?;
    conversion.set_value(&vm.conversion);
    let variable: HtmlSelectElement = element(&document, ids::VARIABLE)?;
    variable.set_value(&vm.variable);

    let elevation: HtmlSelectElement = element(&document, ids::ELEVATION)?;
    fill_select(
        &document,
        &elevation,
        vm.elevation_options
            .iter()
            .map(|e| (e.as_str(), elevation_label(e))),
    )?;
    elevation.set_value(vm.elevation.as_deref().unwrap_or_default());

    let time_range: HtmlInputElement = element(&document, ids::TIME_RANGE)?;
    time_range.set_min("1");
    time_range.set_max(&vm.max_time_steps.to_string());
    time_range.set_value(&vm.time_step.to_string());
    let time_label: Element = element(&document, ids::TIME_LABEL)?;
    time_label.set_text_content(Some(&vm.time_label));

    let heading: Element = element(&document, ids::HEADING)?;
    heading.set_text_content(Some(&vm.single.heading));
    let plot: HtmlImageElement = element(&document, ids::PLOT)?;
    set_image(&plot, &app.image_base, vm.single.image_ref.as_deref(), &vm.single.caption)?;

    render_grid(app, &document, vm)?;
    render_modal(app, &document, vm)
}

fn set_image(
    img: &HtmlImageElement,
    base: &str,
    image_ref: Option<&str>,
    caption: &str,
) -> Result<(), JsValue> {
    match image_ref {
        Some(image_ref) => img.set_src(&image_src(base, image_ref)),
        None => img.remove_attribute("src")?,
    }
    img.set_alt(caption);
    img.set_title(caption);
    Ok(())
}

fn render_grid(app: &mut ViewerApp, document: &Document, vm: &ViewModel) -> Result<(), JsValue> {
    let count: HtmlInputElement = element(document, ids::GRID_COUNT)?;
    count.set_value(&vm.column_runs.len().to_string());

    if app.rendered_pickers != vm.column_runs {
        let container: Element = element(document, ids::GRID_PICKERS)?;
        container.set_inner_html("");
        let runs = app.session.index().runs();
        for (column, run_id) in vm.column_runs.iter().enumerate() {
            let select: HtmlSelectElement = document.create_element("select")?.dyn_into()?;
            select.set_class_name("comparisonRunSelect");
            select.set_attribute(COLUMN_ATTR, &column.to_string())?;
            fill_select(
                document,
                &select,
                runs.iter().map(|r| (r.as_str(), run_label(r))),
            )?;
            select.set_value(run_id);
            container.append_child(&select)?;
        }
        app.rendered_pickers = vm.column_runs.clone();
    }

    let grid: Element = element(document, ids::GRID)?;
    grid.set_inner_html("");
    for (column, col) in vm.columns.iter().enumerate() {
        let cell: HtmlElement = document.create_element("div")?.dyn_into()?;
        cell.set_class_name("comparisonColumn");

        let heading = document.create_element("h3")?;
        heading.set_text_content(Some(&col.heading));
        cell.append_child(&heading)?;

        let img: HtmlImageElement = document.create_element("img")?.dyn_into()?;
        img.set_attribute(COLUMN_ATTR, &column.to_string())?;
        set_image(&img, &app.image_base, col.image_ref.as_deref(), &col.caption)?;
        cell.append_child(&img)?;

        grid.append_child(&cell)?;
    }
    Ok(())
}

fn render_modal(app: &ViewerApp, document: &Document, vm: &ViewModel) -> Result<(), JsValue> {
    let modal: HtmlElement = element(document, ids::MODAL)?;
    let img: HtmlImageElement = element(document, ids::MODAL_IMG)?;

    match (&vm.viewer.image_ref, &vm.viewer.transform_css) {
        (Some(image_ref), Some(css)) => {
            modal.style().set_property("display", "block")?;
            let src = image_src(&app.image_base, image_ref);
            if img.get_attribute("src").as_deref() != Some(src.as_str()) {
                img.set_src(&src);
            }
            img.style().set_property("transform", css)?;
            let cursor = if vm.viewer.dragging { "grabbing" } else { "grab" };
            img.style().set_property("cursor", cursor)?;
        }
        _ => {
            modal.style().set_property("display", "none")?;
            img.remove_attribute("src")?;
        }
    }
    Ok(())
}

async fn fetch_manifest(url: &str) -> Result<ManifestDocument, JsValue> {
    let resp = Request::get(url)
        .send()
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    if !resp.ok() {
        return Err(JsValue::from_str(&format!("HTTP {}", resp.status())));
    }
    let text = resp
        .text()
        .await
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    ManifestDocument::from_json_str(&text).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::image_src;

    #[test]
    fn image_src_joins_relative_refs_only() {
        assert_eq!(image_src("data", "Run101/a.png"), "data/Run101/a.png");
        assert_eq!(image_src("data/", "Run101/a.png"), "data/Run101/a.png");
        assert_eq!(image_src("", "Run101/a.png"), "Run101/a.png");
        assert_eq!(image_src("data", "/abs/a.png"), "/abs/a.png");
        assert_eq!(image_src("data", "https://x/a.png"), "https://x/a.png");
    }
}

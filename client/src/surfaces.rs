//! One labelled canvas per worker, laid out as a near-square grid.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement};

use crate::dom::{create_element, set_style, set_text};
use crate::error::ClientError;
use crate::layout::GridLayout;

pub const CONTAINER_ID: &str = "canvasContainer";

pub struct Surface {
    wrapper: HtmlElement,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl Surface {
    fn create(document: &Document, index: usize) -> Result<Self, ClientError> {
        let wrapper: HtmlElement = create_element(document, "div")?;
        wrapper.set_class_name("canvas-wrapper");

        let label: HtmlElement = create_element(document, "div")?;
        label.set_class_name("canvas-label");
        set_text(&label, &format!("Worker {index}"));

        let canvas: HtmlCanvasElement = create_element(document, "canvas")?;
        let ctx = canvas
            .get_context("2d")?
            .ok_or(ClientError::MissingContext)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| ClientError::MissingContext)?;

        wrapper.append_child(&label)?;
        wrapper.append_child(&canvas)?;
        Ok(Self {
            wrapper,
            canvas,
            ctx,
            width: 0.0,
            height: 0.0,
        })
    }

    fn set_size(&mut self, width: f64, height: f64) {
        self.canvas.set_width(width.floor() as u32);
        self.canvas.set_height(height.floor() as u32);
        set_style(&self.canvas, "width", &format!("{}px", width.floor()));
        set_style(&self.canvas, "height", &format!("{}px", height.floor()));
        self.width = width.floor();
        self.height = height.floor();
    }

    pub fn ctx(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }
}

/// The container is looked up lazily; while it is absent every operation
/// here is a no-op.
pub struct SurfaceSet {
    document: Document,
    container: Option<HtmlElement>,
    surfaces: Vec<Surface>,
    layout: GridLayout,
}

impl SurfaceSet {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            container: None,
            surfaces: Vec::new(),
            layout: GridLayout::for_count(0),
        }
    }

    fn container(&mut self) -> Option<HtmlElement> {
        if self.container.is_none() {
            self.container = self
                .document
                .get_element_by_id(CONTAINER_ID)
                .and_then(|element| element.dyn_into::<HtmlElement>().ok());
        }
        self.container.clone()
    }

    /// Replaces every surface with `count` fresh ones, labelled in row-major
    /// order. The new set is built off-page first; if any surface fails the
    /// old set stays as it was. Old surfaces leave the page before any new
    /// one is added.
    pub fn rebuild(&mut self, count: usize) -> Result<(), ClientError> {
        let Some(container) = self.container() else {
            log::debug!("surface rebuild skipped: #{CONTAINER_ID} not found");
            return Ok(());
        };
        let layout = GridLayout::for_count(count);
        let fresh = create_all(count, |index| -> Result<Surface, ClientError> {
            let surface = Surface::create(&self.document, index)?;
            if let Some((row, col)) = layout.cell(index) {
                set_style(&surface.wrapper, "grid-row", &(row + 1).to_string());
                set_style(&surface.wrapper, "grid-column", &(col + 1).to_string());
            }
            Ok(surface)
        })?;

        for surface in self.surfaces.drain(..) {
            surface.wrapper.remove();
        }
        self.layout = layout;
        set_style(
            &container,
            "grid-template-columns",
            &format!("repeat({}, auto)", layout.cols.max(1)),
        );
        for surface in &fresh {
            if let Err(err) = container.append_child(&surface.wrapper) {
                log::error!("surface append failed: {err:?}");
            }
        }
        self.surfaces = fresh;
        log::info!(
            "surfaces rebuilt count={count} grid={}x{}",
            layout.cols,
            layout.rows
        );
        self.resize();
        Ok(())
    }

    /// Resizes the existing surfaces to the container; count and labels are
    /// left alone.
    pub fn resize(&mut self) {
        let Some(container) = self.container() else {
            return;
        };
        let (width, height) = self.layout.surface_size(
            f64::from(container.client_width()),
            f64::from(container.client_height()),
        );
        for surface in &mut self.surfaces {
            surface.set_size(width, height);
        }
        log::debug!("surfaces resized to {width:.1}x{height:.1}");
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn get(&self, index: usize) -> Option<&Surface> {
        self.surfaces.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Surface)> {
        self.surfaces.iter().enumerate()
    }
}

/// Creates `count` items in index order: all of them, or the first error.
fn create_all<T, E>(
    count: usize,
    create: impl FnMut(usize) -> Result<T, E>,
) -> Result<Vec<T>, E> {
    (0..count).map(create).collect()
}

#[cfg(test)]
#[path = "surfaces_test.rs"]
mod surfaces_test;

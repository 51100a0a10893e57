//! fabric.js bindings and the [`VectorCanvas`] backend built on them.
//!
//! Retina scaling is disabled so the lower canvas element holds exactly one
//! pixel per scene unit; `rasterize` reads it back after a synchronous
//! `renderAll`.

use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use guessboard_shared::{
    CanvasError, EncodedImage, PixelBuffer, Point, Rgba, SceneState, VectorCanvas,
};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = fabric, js_name = Canvas)]
    #[derive(Clone, Debug)]
    pub type FabricCanvas;

    #[wasm_bindgen(constructor, js_namespace = fabric, js_class = "Canvas")]
    fn new(element_id: &str, options: &JsValue) -> FabricCanvas;

    #[wasm_bindgen(method, js_name = getWidth)]
    fn get_width(this: &FabricCanvas) -> f64;

    #[wasm_bindgen(method, js_name = getHeight)]
    fn get_height(this: &FabricCanvas) -> f64;

    #[wasm_bindgen(method, js_name = setDimensions)]
    fn set_dimensions(this: &FabricCanvas, dimensions: &JsValue);

    #[wasm_bindgen(method, getter, js_name = lowerCanvasEl)]
    fn lower_canvas_el(this: &FabricCanvas) -> HtmlCanvasElement;

    #[wasm_bindgen(method, js_name = renderAll)]
    fn render_all(this: &FabricCanvas);

    #[wasm_bindgen(method, js_name = toJSON)]
    fn to_json(this: &FabricCanvas) -> JsValue;

    #[wasm_bindgen(method, js_name = loadFromJSON)]
    fn load_from_json(this: &FabricCanvas, json: &JsValue, callback: &JsValue);

    #[wasm_bindgen(method, js_name = setBackgroundImage)]
    fn set_background_image(
        this: &FabricCanvas,
        image: &FabricImage,
        callback: &JsValue,
        options: &JsValue,
    );

    #[wasm_bindgen(method, setter, js_name = backgroundColor)]
    fn set_background_color(this: &FabricCanvas, color: &str);

    #[wasm_bindgen(method, js_name = getObjects)]
    fn get_objects(this: &FabricCanvas) -> Array;

    #[wasm_bindgen(method)]
    fn remove(this: &FabricCanvas, object: &JsValue);

    #[wasm_bindgen(method)]
    fn clear(this: &FabricCanvas);

    #[wasm_bindgen(method, setter, js_name = isDrawingMode)]
    fn set_is_drawing_mode(this: &FabricCanvas, enabled: bool);

    #[wasm_bindgen(method, setter)]
    fn set_selection(this: &FabricCanvas, enabled: bool);

    #[wasm_bindgen(method, setter, js_name = defaultCursor)]
    fn set_default_cursor(this: &FabricCanvas, cursor: &str);

    #[wasm_bindgen(method, setter, js_name = hoverCursor)]
    fn set_hover_cursor(this: &FabricCanvas, cursor: &str);

    #[wasm_bindgen(method, setter, js_name = freeDrawingBrush)]
    fn set_free_drawing_brush(this: &FabricCanvas, brush: &PencilBrush);

    #[wasm_bindgen(method, js_name = getPointer)]
    fn get_pointer(this: &FabricCanvas, event: &JsValue) -> JsValue;

    #[wasm_bindgen(method)]
    fn on(this: &FabricCanvas, event: &str, handler: &Function);

    #[wasm_bindgen(js_namespace = fabric, js_name = PencilBrush)]
    #[derive(Clone, Debug)]
    pub type PencilBrush;

    #[wasm_bindgen(constructor, js_namespace = fabric, js_class = "PencilBrush")]
    fn new(canvas: &FabricCanvas) -> PencilBrush;

    #[wasm_bindgen(method, setter)]
    fn set_color(this: &PencilBrush, color: &str);

    #[wasm_bindgen(method, setter)]
    fn set_width(this: &PencilBrush, width: f64);

    #[wasm_bindgen(js_namespace = fabric, js_name = Image)]
    #[derive(Clone, Debug)]
    pub type FabricImage;

    #[wasm_bindgen(constructor, js_namespace = fabric, js_class = "Image")]
    fn new(element: &HtmlImageElement, options: &JsValue) -> FabricImage;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CanvasOptions<'a> {
    is_drawing_mode: bool,
    background_color: &'a str,
    width: f64,
    height: f64,
    preserve_object_stacking: bool,
    enable_retina_scaling: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageOptions {
    origin_x: &'static str,
    origin_y: &'static str,
    left: f64,
    top: f64,
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let text = serde_json::to_string(value).map_err(|error| JsValue::from_str(&error.to_string()))?;
    js_sys::JSON::parse(&text)
}

fn backend_error(context: &str, error: JsValue) -> CanvasError {
    CanvasError::Backend(format!("{context}: {error:?}"))
}

struct StagedImage {
    url: String,
    image: FabricImage,
}

pub struct WebCanvas {
    canvas: FabricCanvas,
    brush: PencilBrush,
    staged: Option<StagedImage>,
}

impl WebCanvas {
    pub fn new(element_id: &str, width: f64, height: f64, background: Rgba) -> Result<Self, JsValue> {
        let options = to_js(&CanvasOptions {
            is_drawing_mode: true,
            background_color: &background.to_hex(),
            width,
            height,
            preserve_object_stacking: true,
            enable_retina_scaling: false,
        })?;
        let canvas = FabricCanvas::new(element_id, &options);
        let brush = PencilBrush::new(&canvas);
        canvas.set_free_drawing_brush(&brush);
        Ok(Self {
            canvas,
            brush,
            staged: None,
        })
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        let dimensions = js_sys::Object::new();
        let _ = Reflect::set(&dimensions, &"width".into(), &width.into());
        let _ = Reflect::set(&dimensions, &"height".into(), &height.into());
        self.canvas.set_dimensions(&dimensions);
    }

    /// Registers a fabric event handler for the lifetime of the page.
    pub fn on(&self, event: &str, handler: Closure<dyn FnMut(JsValue)>) {
        self.canvas.on(event, handler.as_ref().unchecked_ref());
        handler.forget();
    }

    /// Scene coordinates of a fabric mouse event.
    pub fn pointer(&self, event: &JsValue) -> Option<Point> {
        let inner = Reflect::get(event, &"e".into()).ok()?;
        let pointer = self.canvas.get_pointer(&inner);
        let x = Reflect::get(&pointer, &"x".into()).ok()?.as_f64()?;
        let y = Reflect::get(&pointer, &"y".into()).ok()?.as_f64()?;
        Some(Point::new(x as f32, y as f32))
    }

    /// Hands over the decoded fill image; the next matching
    /// `set_background_image` call installs it.
    pub fn stage_background(&mut self, url: String, element: &HtmlImageElement) -> Result<(), JsValue> {
        let options = to_js(&ImageOptions {
            origin_x: "left",
            origin_y: "top",
            left: 0.0,
            top: 0.0,
        })?;
        let image = FabricImage::new(element, &options);
        self.staged = Some(StagedImage { url, image });
        Ok(())
    }

    fn set_objects_selectable(&self, selectable: bool) {
        for object in self.canvas.get_objects().iter() {
            let _ = Reflect::set(&object, &"selectable".into(), &selectable.into());
        }
    }
}

impl VectorCanvas for WebCanvas {
    fn width(&self) -> u32 {
        self.canvas.get_width().max(0.0) as u32
    }

    fn height(&self) -> u32 {
        self.canvas.get_height().max(0.0) as u32
    }

    fn rasterize(&mut self) -> Result<PixelBuffer, CanvasError> {
        self.canvas.render_all();
        let element = self.canvas.lower_canvas_el();
        let (width, height) = (element.width(), element.height());
        let context = element
            .get_context("2d")
            .map_err(|error| backend_error("getContext", error))?
            .ok_or_else(|| CanvasError::Backend("2d context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| CanvasError::Backend("unexpected context type".into()))?;
        let image = context
            .get_image_data(0.0, 0.0, f64::from(width), f64::from(height))
            .map_err(|error| backend_error("getImageData", error))?;
        PixelBuffer::from_rgba(width, height, image.data().0)
    }

    fn serialize_scene(&self) -> Result<SceneState, CanvasError> {
        let json = js_sys::JSON::stringify(&self.canvas.to_json())
            .map_err(|error| CanvasError::Serialize(format!("{error:?}")))?;
        Ok(SceneState::new(String::from(json)))
    }

    fn load_scene(&mut self, state: &SceneState) -> Result<(), CanvasError> {
        let json = js_sys::JSON::parse(state.as_str())
            .map_err(|error| CanvasError::Restore(format!("{error:?}")))?;
        self.staged = None;
        let canvas = self.canvas.clone();
        let on_loaded = Closure::once_into_js(move || canvas.render_all());
        self.canvas.load_from_json(&json, &on_loaded);
        Ok(())
    }

    fn set_background_image(&mut self, image: &EncodedImage) -> Result<(), CanvasError> {
        let url = image.to_data_url();
        let staged = match self.staged.take() {
            Some(staged) if staged.url == url => staged,
            _ => return Err(CanvasError::Decode("fill image was not staged".into())),
        };
        self.canvas
            .set_background_image(&staged.image, &JsValue::UNDEFINED, &JsValue::UNDEFINED);
        Ok(())
    }

    fn clear_background_color(&mut self) {
        self.canvas.set_background_color("transparent");
    }

    fn object_count(&self) -> usize {
        self.canvas.get_objects().length() as usize
    }

    fn remove_object(&mut self, index: usize) {
        let object = self.canvas.get_objects().get(index as u32);
        if !object.is_undefined() {
            self.canvas.remove(&object);
        }
    }

    fn clear(&mut self, background: Rgba) {
        self.staged = None;
        self.canvas.clear();
        self.canvas.set_background_color(&background.to_hex());
    }

    fn set_drawing_mode(&mut self, enabled: bool) {
        self.canvas.set_is_drawing_mode(enabled);
        self.canvas.set_selection(enabled);
        let (default_cursor, hover_cursor) = if enabled {
            ("default", "move")
        } else {
            ("crosshair", "crosshair")
        };
        self.canvas.set_default_cursor(default_cursor);
        self.canvas.set_hover_cursor(hover_cursor);
        self.set_objects_selectable(enabled);
    }

    fn set_brush_color(&mut self, color: Rgba) {
        self.brush.set_color(&color.to_hex());
    }

    fn set_brush_width(&mut self, width: f32) {
        self.brush.set_width(f64::from(width));
    }

    fn render(&mut self) {
        self.canvas.render_all();
    }
}

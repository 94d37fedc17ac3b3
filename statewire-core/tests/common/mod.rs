//! A small in-memory stand-in for a handle-based graphics API, and the
//! panels the integration tests hang off it.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use statewire_core::deps::SubscriberId;
use statewire_core::value::format_boolean;
use statewire_core::{
    AnchorId, ApiSurface, Engine, Handle, ObjectKind, Observer, ReferenceKind, ReferenceList,
    Result, SlotDescriptor, StateTableView, Subscriber, SyncMode, Value, View, ViewRef,
};

pub const ARRAY_BUFFER: u32 = 0x8892;
pub const ELEMENT_ARRAY_BUFFER: u32 = 0x8893;
pub const TEXTURE_2D: u32 = 0x0DE1;
pub const TEXTURE_CUBE_MAP: u32 = 0x8513;
pub const TEXTURE0: u32 = 0x84C0;
pub const VERTEX_SHADER: u32 = 0x8B31;
pub const FRAGMENT_SHADER: u32 = 0x8B30;
pub const BLEND: u32 = 0x0BE2;
pub const DEPTH_TEST: u32 = 0x0B71;

const TEXTURE_UNITS: usize = 8;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MockError {
    #[error("unknown entry point `{0}`")]
    UnknownEntryPoint(String),
    #[error("{0}: invalid enum")]
    InvalidEnum(&'static str),
    #[error("{0}: invalid operation")]
    InvalidOperation(&'static str),
    #[error("{0}: bad arguments")]
    BadArguments(&'static str),
}

#[derive(Debug)]
pub struct MockGl {
    next_handle: u64,
    buffers: HashSet<Handle>,
    textures: HashSet<Handle>,
    shaders: HashMap<Handle, u32>,
    programs: HashMap<Handle, Vec<Handle>>,
    vertex_arrays: HashSet<Handle>,
    array_buffer: Option<Handle>,
    element_array_buffer: Option<Handle>,
    vertex_array: Option<Handle>,
    active_unit: usize,
    texture_units: [Option<Handle>; TEXTURE_UNITS],
    current_program: Option<Handle>,
    clear_color: [f64; 4],
    enabled: HashSet<u32>,
}

impl Default for MockGl {
    fn default() -> Self {
        Self {
            next_handle: 1,
            buffers: HashSet::new(),
            textures: HashSet::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            vertex_arrays: HashSet::new(),
            array_buffer: None,
            element_array_buffer: None,
            vertex_array: None,
            active_unit: 0,
            texture_units: [None; TEXTURE_UNITS],
            current_program: None,
            clear_color: [0.0; 4],
            enabled: HashSet::new(),
        }
    }
}

fn int_arg(args: &[Value], index: usize, entry_point: &'static str) -> Result<u32, MockError> {
    args.get(index)
        .and_then(Value::as_int)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or(MockError::BadArguments(entry_point))
}

fn float_arg(args: &[Value], index: usize, entry_point: &'static str) -> Result<f64, MockError> {
    args.get(index)
        .and_then(Value::as_float)
        .ok_or(MockError::BadArguments(entry_point))
}

/// A handle argument; `None` for null.
fn handle_arg(args: &[Value], index: usize, entry_point: &'static str) -> Result<Option<Handle>, MockError> {
    match args.get(index) {
        Some(Value::Handle(handle)) => Ok(Some(*handle)),
        Some(Value::Null) => Ok(None),
        _ => Err(MockError::BadArguments(entry_point)),
    }
}

impl MockGl {
    pub fn new() -> Self {
        Self::default()
    }

    fn issue(&mut self) -> Handle {
        let handle = Handle::from_raw(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Create a buffer without going through any interception.
    pub fn create_buffer_directly(&mut self) -> Handle {
        let handle = self.issue();
        self.buffers.insert(handle);
        handle
    }

    /// Live state query, as a `getParameter` would answer it.
    pub fn get_parameter(&self, pname: &str) -> Value {
        match pname {
            "ARRAY_BUFFER_BINDING" => self.array_buffer.into(),
            "ELEMENT_ARRAY_BUFFER_BINDING" => self.element_array_buffer.into(),
            "VERTEX_ARRAY_BINDING" => self.vertex_array.into(),
            "CURRENT_PROGRAM" => self.current_program.into(),
            "ACTIVE_TEXTURE" => Value::Int(i64::from(TEXTURE0) + self.active_unit as i64),
            "TEXTURE_BINDING_2D" => self.texture_units[self.active_unit].into(),
            "COLOR_CLEAR_VALUE" => Value::Floats(self.clear_color.to_vec()),
            "BLEND" => Value::Bool(self.enabled.contains(&BLEND)),
            "DEPTH_TEST" => Value::Bool(self.enabled.contains(&DEPTH_TEST)),
            _ => Value::Null,
        }
    }

    pub fn attached_shaders(&self, program: Handle) -> Vec<Handle> {
        self.programs.get(&program).cloned().unwrap_or_default()
    }

    fn bind_buffer(&mut self, args: &[Value]) -> Result<Value, MockError> {
        let target = int_arg(args, 0, "bindBuffer")?;
        let buffer = handle_arg(args, 1, "bindBuffer")?;
        if buffer.is_some_and(|b| !self.buffers.contains(&b)) {
            return Err(MockError::InvalidOperation("bindBuffer"));
        }
        match target {
            ARRAY_BUFFER => self.array_buffer = buffer,
            ELEMENT_ARRAY_BUFFER => self.element_array_buffer = buffer,
            _ => return Err(MockError::InvalidEnum("bindBuffer")),
        }
        Ok(Value::Void)
    }

    fn bind_texture(&mut self, args: &[Value]) -> Result<Value, MockError> {
        let target = int_arg(args, 0, "bindTexture")?;
        let texture = handle_arg(args, 1, "bindTexture")?;
        if texture.is_some_and(|t| !self.textures.contains(&t)) {
            return Err(MockError::InvalidOperation("bindTexture"));
        }
        match target {
            TEXTURE_2D => self.texture_units[self.active_unit] = texture,
            TEXTURE_CUBE_MAP => {}
            _ => return Err(MockError::InvalidEnum("bindTexture")),
        }
        Ok(Value::Void)
    }

    fn attach_shader(&mut self, args: &[Value], attach: bool) -> Result<Value, MockError> {
        let name = if attach { "attachShader" } else { "detachShader" };
        let program = handle_arg(args, 0, name)?.ok_or(MockError::BadArguments(name))?;
        let shader = handle_arg(args, 1, name)?.ok_or(MockError::BadArguments(name))?;
        if !self.shaders.contains_key(&shader) {
            return Err(MockError::InvalidOperation(name));
        }
        let attached = self
            .programs
            .get_mut(&program)
            .ok_or(MockError::InvalidOperation(name))?;
        match (attach, attached.iter().position(|s| *s == shader)) {
            (true, None) => attached.push(shader),
            (false, Some(index)) => {
                attached.remove(index);
            }
            _ => return Err(MockError::InvalidOperation(name)),
        }
        Ok(Value::Void)
    }
}

impl ApiSurface for MockGl {
    type Error = MockError;

    fn invoke(&mut self, entry_point: &str, args: &[Value]) -> Result<Value, MockError> {
        match entry_point {
            "createBuffer" => {
                let handle = self.issue();
                self.buffers.insert(handle);
                Ok(Value::Handle(handle))
            }
            "deleteBuffer" => {
                if let Some(buffer) = handle_arg(args, 0, "deleteBuffer")? {
                    self.buffers.remove(&buffer);
                    if self.array_buffer == Some(buffer) {
                        self.array_buffer = None;
                    }
                    if self.element_array_buffer == Some(buffer) {
                        self.element_array_buffer = None;
                    }
                }
                Ok(Value::Void)
            }
            "bindBuffer" => self.bind_buffer(args),

            "createTexture" => {
                let handle = self.issue();
                self.textures.insert(handle);
                Ok(Value::Handle(handle))
            }
            "deleteTexture" => {
                if let Some(texture) = handle_arg(args, 0, "deleteTexture")? {
                    self.textures.remove(&texture);
                    for unit in self.texture_units.iter_mut() {
                        if *unit == Some(texture) {
                            *unit = None;
                        }
                    }
                }
                Ok(Value::Void)
            }
            "bindTexture" => self.bind_texture(args),
            "activeTexture" => {
                let unit = int_arg(args, 0, "activeTexture")?
                    .checked_sub(TEXTURE0)
                    .map(|unit| unit as usize)
                    .filter(|unit| *unit < TEXTURE_UNITS)
                    .ok_or(MockError::InvalidEnum("activeTexture"))?;
                self.active_unit = unit;
                Ok(Value::Void)
            }

            "createVertexArray" => {
                let handle = self.issue();
                self.vertex_arrays.insert(handle);
                Ok(Value::Handle(handle))
            }
            "deleteVertexArray" => {
                if let Some(vao) = handle_arg(args, 0, "deleteVertexArray")? {
                    self.vertex_arrays.remove(&vao);
                    if self.vertex_array == Some(vao) {
                        self.vertex_array = None;
                    }
                }
                Ok(Value::Void)
            }
            "bindVertexArray" => {
                let vao = handle_arg(args, 0, "bindVertexArray")?;
                if vao.is_some_and(|v| !self.vertex_arrays.contains(&v)) {
                    return Err(MockError::InvalidOperation("bindVertexArray"));
                }
                self.vertex_array = vao;
                Ok(Value::Void)
            }

            "createShader" => match int_arg(args, 0, "createShader")? {
                kind @ (VERTEX_SHADER | FRAGMENT_SHADER) => {
                    let handle = self.issue();
                    self.shaders.insert(handle, kind);
                    Ok(Value::Handle(handle))
                }
                _ => Err(MockError::InvalidEnum("createShader")),
            },
            "deleteShader" => {
                if let Some(shader) = handle_arg(args, 0, "deleteShader")? {
                    self.shaders.remove(&shader);
                }
                Ok(Value::Void)
            }
            "createProgram" => {
                let handle = self.issue();
                self.programs.insert(handle, Vec::new());
                Ok(Value::Handle(handle))
            }
            "deleteProgram" => {
                if let Some(program) = handle_arg(args, 0, "deleteProgram")? {
                    self.programs.remove(&program);
                    if self.current_program == Some(program) {
                        self.current_program = None;
                    }
                }
                Ok(Value::Void)
            }
            "attachShader" => self.attach_shader(args, true),
            "detachShader" => self.attach_shader(args, false),
            "useProgram" => {
                let program = handle_arg(args, 0, "useProgram")?;
                if program.is_some_and(|p| !self.programs.contains_key(&p)) {
                    return Err(MockError::InvalidOperation("useProgram"));
                }
                self.current_program = program;
                Ok(Value::Void)
            }

            "clearColor" => {
                for (index, channel) in self.clear_color.iter_mut().enumerate() {
                    *channel = float_arg(args, index, "clearColor")?;
                }
                Ok(Value::Void)
            }
            "enable" => {
                self.enabled.insert(int_arg(args, 0, "enable")?);
                Ok(Value::Void)
            }
            "disable" => {
                self.enabled.remove(&int_arg(args, 0, "disable")?);
                Ok(Value::Void)
            }
            "drawArrays" | "clear" => Ok(Value::Void),

            other => Err(MockError::UnknownEntryPoint(other.to_owned())),
        }
    }
}

/// Panel for a single object. Counts its resyncs.
#[derive(Debug)]
pub struct ObjectPanel {
    pub name: String,
    pub handle: Handle,
    anchor: AnchorId,
    initial: Cell<usize>,
    updates: Cell<usize>,
    detached: Cell<bool>,
}

impl ObjectPanel {
    pub fn new(name: &str, handle: Handle) -> Self {
        Self {
            name: name.to_owned(),
            handle,
            anchor: AnchorId::new(),
            initial: Cell::new(0),
            updates: Cell::new(0),
            detached: Cell::new(false),
        }
    }

    pub fn initial_resyncs(&self) -> usize {
        self.initial.get()
    }

    pub fn update_resyncs(&self) -> usize {
        self.updates.get()
    }

    pub fn is_detached(&self) -> bool {
        self.detached.get()
    }
}

impl View<MockGl> for ObjectPanel {
    fn resync(&self, _engine: &Engine<MockGl>, mode: SyncMode) -> Result<()> {
        let counter = if mode.is_initial() { &self.initial } else { &self.updates };
        counter.set(counter.get() + 1);
        Ok(())
    }

    fn anchor(&self) -> AnchorId {
        self.anchor
    }

    fn detach(&self, _engine: &Engine<MockGl>) {
        self.detached.set(true);
    }
}

/// Panel for a program: lists the attached shaders, with an edge to each.
#[derive(Debug)]
pub struct ProgramPanel {
    pub handle: Handle,
    anchor: AnchorId,
    pub shaders: ReferenceList,
    subscriber: Cell<Option<SubscriberId>>,
}

impl View<MockGl> for ProgramPanel {
    fn resync(&self, engine: &Engine<MockGl>, mode: SyncMode) -> Result<()> {
        let attached = engine.api().attached_shaders(self.handle);
        self.shaders.reconcile(engine, &attached, mode)?;
        Ok(())
    }

    fn anchor(&self) -> AnchorId {
        self.anchor
    }

    fn children(&self) -> Vec<AnchorId> {
        self.shaders.anchors()
    }

    fn detach(&self, engine: &Engine<MockGl>) {
        self.shaders.clear(engine);
        if let Some(id) = self.subscriber.take() {
            engine.unsubscribe(id);
        }
    }
}

/// Every panel the fixture's creation observers have built.
#[derive(Debug, Default)]
pub struct Panels {
    pub objects: RefCell<HashMap<Handle, Rc<ObjectPanel>>>,
    pub programs: RefCell<HashMap<Handle, Rc<ProgramPanel>>>,
}

impl Panels {
    pub fn object(&self, handle: Handle) -> Rc<ObjectPanel> {
        Rc::clone(&self.objects.borrow()[&handle])
    }

    pub fn program(&self, handle: Handle) -> Rc<ProgramPanel> {
        Rc::clone(&self.programs.borrow()[&handle])
    }
}

fn track_objects(engine: &Engine<MockGl>, panels: &Rc<Panels>, create: &str, delete: &str, kind: ObjectKind) {
    let panels = Rc::clone(panels);
    engine.track_creation(create, kind, move |_engine, name, handle| {
        let panel = Rc::new(ObjectPanel::new(name, handle));
        panels.objects.borrow_mut().insert(handle, Rc::clone(&panel));
        let view: ViewRef<MockGl> = panel;
        Ok(view)
    });
    engine.track_deletion(delete);
}

fn track_programs(engine: &Engine<MockGl>, panels: &Rc<Panels>) {
    let panels = Rc::clone(panels);
    engine.track_creation("createProgram", ObjectKind::Program, move |engine, _name, handle| {
        let panel = Rc::new(ProgramPanel {
            handle,
            anchor: AnchorId::new(),
            shaders: ReferenceList::new(),
            subscriber: Cell::new(None),
        });

        let weak = Rc::downgrade(&panel);
        let subscriber = Subscriber::new(move |engine: &Engine<MockGl>| match weak.upgrade() {
            Some(panel) => panel.resync(engine, SyncMode::Update),
            None => Ok(()),
        });
        engine.subscribe_all(&["attachShader", "detachShader"], &subscriber);
        panel.subscriber.set(Some(subscriber.id()));

        panels.programs.borrow_mut().insert(handle, Rc::clone(&panel));
        let view: ViewRef<MockGl> = panel;
        Ok(view)
    });
    engine.track_deletion("deleteProgram");
}

pub fn global_descriptors() -> Vec<SlotDescriptor> {
    vec![
        SlotDescriptor::new("ARRAY_BUFFER_BINDING")
            .setter("bindBuffer")
            .setter("deleteBuffer")
            .reference(ReferenceKind::Object),
        SlotDescriptor::new("ELEMENT_ARRAY_BUFFER_BINDING")
            .setter("bindBuffer")
            .setter("deleteBuffer")
            .reference(ReferenceKind::Object),
        SlotDescriptor::new("VERTEX_ARRAY_BINDING")
            .setter("bindVertexArray")
            .setter("deleteVertexArray")
            .reference(ReferenceKind::ObjectOrDefault),
        SlotDescriptor::new("CURRENT_PROGRAM")
            .setter("useProgram")
            .setter("deleteProgram")
            .reference(ReferenceKind::Object),
        SlotDescriptor::new("ACTIVE_TEXTURE")
            .setter("activeTexture")
            .formatter(|value| match value.as_int() {
                Some(v) => format!("TEXTURE{}", v - i64::from(TEXTURE0)),
                None => "null".to_owned(),
            }),
        SlotDescriptor::new("TEXTURE_BINDING_2D")
            .setter("activeTexture")
            .setter("bindTexture")
            .setter("deleteTexture")
            .reference(ReferenceKind::Object),
        SlotDescriptor::new("COLOR_CLEAR_VALUE").setter("clearColor"),
        SlotDescriptor::new("BLEND")
            .setter("enable")
            .setter("disable")
            .formatter(format_boolean),
        SlotDescriptor::new("DEPTH_TEST")
            .setter("enable")
            .setter("disable")
            .formatter(format_boolean),
    ]
}

pub fn query(engine: &Engine<MockGl>, slot: &SlotDescriptor) -> Value {
    engine.api().get_parameter(slot.pname())
}

pub struct Fixture {
    pub engine: Engine<MockGl>,
    pub panels: Rc<Panels>,
    pub globals: Rc<StateTableView<MockGl>>,
    pub default_panel: Rc<ObjectPanel>,
}

impl Fixture {
    pub fn call(&self, entry_point: &str, args: &[Value]) -> Value {
        match self.engine.call(entry_point, args) {
            Ok(value) => value,
            Err(e) => panic!("{entry_point} failed: {e}"),
        }
    }

    pub fn create(&self, entry_point: &str) -> Handle {
        self.call(entry_point, &[])
            .as_handle()
            .unwrap_or_else(|| panic!("{entry_point} returned no handle"))
    }

    pub fn row_anchor(&self, pname: &str) -> AnchorId {
        self.globals.row_anchor(pname).expect("unknown row")
    }

    /// Edges leaving a global-state row.
    pub fn edges_from_row(&self, pname: &str) -> usize {
        self.engine.arrows().edges_from(self.row_anchor(pname)).count()
    }
}

/// Engine over a fresh `MockGl` with every object kind tracked, a global
/// state table mounted, and a panel for the default vertex array.
pub fn fixture() -> Fixture {
    let engine = Engine::new(MockGl::new());
    let panels = Rc::new(Panels::default());

    track_objects(&engine, &panels, "createBuffer", "deleteBuffer", ObjectKind::Buffer);
    track_objects(&engine, &panels, "createTexture", "deleteTexture", ObjectKind::Texture);
    track_objects(&engine, &panels, "createShader", "deleteShader", ObjectKind::Shader);
    track_objects(
        &engine,
        &panels,
        "createVertexArray",
        "deleteVertexArray",
        ObjectKind::VertexArray,
    );
    track_programs(&engine, &panels);

    // Record the first target each texture is bound to.
    engine.wrap(
        "bindTexture",
        Observer::custom(|engine, call| {
            if let (Some(target), Some(texture)) = (call.arg(0).and_then(Value::as_int), call.handle_arg(1)) {
                engine.set_bind_target(texture, target as u32)?;
            }
            Ok(())
        }),
    );

    let default_panel = Rc::new(ObjectPanel::new("*default*", Handle::DEFAULT));
    engine
        .set_default_view(Rc::clone(&default_panel) as ViewRef<MockGl>)
        .expect("default view");

    let globals = StateTableView::new("global state", global_descriptors(), query);
    globals.mount(&engine).expect("mount global state");

    Fixture {
        engine,
        panels,
        globals,
        default_panel,
    }
}

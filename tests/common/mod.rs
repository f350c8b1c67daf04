#![allow(dead_code)]

//! Host types shared by the integration tests, modelled after a small build
//! file: a project with build paths, interfaces and file selectors.

use std::net::IpAddr;
use std::path::PathBuf;
use trellis::builder::{AttributeValue, ValueKind};
use trellis::{AttributeMap, AttributeType, Configurable, Configurator, Operations, Shared, TypeRef, shared};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A builder rooted at a fresh [`Project`], with the usual typedefs.
pub fn project_session() -> (Configurator, Shared<Project>) {
    init_logger();
    let project = shared(Project::default());
    let mut conf = Configurator::new();
    conf.type_def_of::<MyFileSelector>("selector");
    conf.type_def_of::<XInterface>("iface");
    conf.set_root(project.clone());
    (conf, project)
}

pub trait FileSelector {
    fn pattern(&self) -> String;
}

pub trait NamedFileSelector: FileSelector {
    fn selector_name(&self) -> String;
}

#[derive(Default)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub build_paths: Vec<Shared<BuildPath>>,
    pub interfaces: Vec<Shared<XInterface>>,
    pub filesets: Vec<Shared<FileSet>>,
    pub selectors: Vec<Shared<dyn FileSelector>>,
    pub named_selectors: Vec<Shared<dyn NamedFileSelector>>,
    pub properties: Vec<Shared<AttributeMap>>,
}

impl Configurable for Project {
    fn describe(ops: &mut Operations<Self>) {
        ops.takes_value("setName", |this, name: String| this.name = name)
            .takes_value("addText", |this, text: String| this.description.push_str(&text))
            .returns_child("createBuildPath", |this| {
                let path = shared(BuildPath::default());
                this.build_paths.push(path.clone());
                path
            })
            .takes_child("addConfiguredXInterface", |this, iface: Shared<XInterface>| {
                this.interfaces.push(iface)
            })
            .takes_child("addConfigured", |this, iface: Shared<XInterface>| {
                this.interfaces.push(iface)
            })
            .takes_child("addFileset", |this, fileset: Shared<FileSet>| {
                this.filesets.push(fileset)
            })
            .takes_child("addConfiguredProperties", |this, map: Shared<AttributeMap>| {
                this.properties.push(map)
            })
            .takes_abstract_child("add", |this, selector: Shared<dyn FileSelector>| {
                this.selectors.push(selector)
            })
            .takes_abstract_child("add", |this, selector: Shared<dyn NamedFileSelector>| {
                this.named_selectors.push(selector)
            });
    }
}

#[derive(Default)]
pub struct BuildPath {
    pub path: Option<PathBuf>,
    pub recursive: bool,
    pub depth: i32,
    pub label: String,
    pub numeric_label: Option<i32>,
    pub includes: Vec<Shared<Include>>,
}

impl Configurable for BuildPath {
    fn describe(ops: &mut Operations<Self>) {
        ops.takes_value("setPath", |this, path: PathBuf| this.path = Some(path))
            .takes_value("setRecursive", |this, recursive: bool| this.recursive = recursive)
            .takes_value("setDepth", |this, depth: i32| this.depth = depth)
            .takes_value("setLabel", |this, label: i32| this.numeric_label = Some(label))
            .takes_value("setLabel", |this, label: String| this.label = label)
            .takes_child("addConfiguredInclude", |this, include: Shared<Include>| {
                this.includes.push(include)
            });
    }
}

impl BuildPath {
    pub fn include_names(&self) -> Vec<String> {
        self.includes
            .iter()
            .map(|include| include.borrow().name.clone())
            .collect()
    }
}

#[derive(Default)]
pub struct Include {
    pub name: String,
}

impl Configurable for Include {
    fn describe(ops: &mut Operations<Self>) {
        ops.takes_value("setName", |this, name: String| this.name = name);
    }
}

/// A language tag with no string constructor.
pub struct Locale(pub String);

impl AttributeType for Locale {
    fn kind() -> ValueKind {
        ValueKind::Opaque("Locale")
    }

    fn from_value(_value: AttributeValue) -> Option<Self> {
        None
    }
}

#[derive(Default)]
pub struct XInterface {
    pub name: String,
    pub version: i64,
    pub priority: i16,
    pub separator: char,
    pub enabled: bool,
    pub ratio: f64,
    pub kind: Option<TypeRef>,
    pub locale: Option<Locale>,
    pub file: Option<PathBuf>,
    pub address: Option<IpAddr>,
}

impl Configurable for XInterface {
    fn describe(ops: &mut Operations<Self>) {
        ops.takes_value("setName", |this, name: String| this.name = name)
            .takes_value("setVersion", |this, version: i64| this.version = version)
            .takes_value("setPriority", |this, priority: i16| this.priority = priority)
            .takes_value("setSeparator", |this, separator: char| this.separator = separator)
            .takes_value("setEnabled", |this, enabled: bool| this.enabled = enabled)
            .takes_value("setRatio", |this, ratio: f64| this.ratio = ratio)
            .takes_value("setKind", |this, kind: TypeRef| this.kind = Some(kind))
            .takes_value("setLocale", |this, locale: Locale| this.locale = Some(locale))
            .takes_value("setFile", |this, file: PathBuf| this.file = Some(file))
            .takes_parsed("setAddress", |this, address: IpAddr| this.address = Some(address));
    }
}

#[derive(Default)]
pub struct FileSet {
    pub dir: String,
    pub selectors: Vec<Shared<dyn FileSelector>>,
}

impl Configurable for FileSet {
    fn describe(ops: &mut Operations<Self>) {
        ops.takes_value("setDir", |this, dir: String| this.dir = dir)
            .takes_abstract_child("add", |this, selector: Shared<dyn FileSelector>| {
                this.selectors.push(selector)
            });
    }
}

/// Assignable to [`FileSelector`] only.
#[derive(Default)]
pub struct MyFileSelector {
    pub pattern: String,
}

impl FileSelector for MyFileSelector {
    fn pattern(&self) -> String {
        self.pattern.clone()
    }
}

impl Configurable for MyFileSelector {
    fn describe(ops: &mut Operations<Self>) {
        ops.implements::<dyn FileSelector>(|it| it)
            .takes_value("setPattern", |this, pattern: String| this.pattern = pattern);
    }
}

/// Assignable to both [`FileSelector`] and [`NamedFileSelector`].
#[derive(Default)]
pub struct NamedSelector {
    pub name: String,
}

impl FileSelector for NamedSelector {
    fn pattern(&self) -> String {
        format!("**/{}", self.name)
    }
}

impl NamedFileSelector for NamedSelector {
    fn selector_name(&self) -> String {
        self.name.clone()
    }
}

impl Configurable for NamedSelector {
    fn describe(ops: &mut Operations<Self>) {
        ops.implements::<dyn FileSelector>(|it| it)
            .implements::<dyn NamedFileSelector>(|it| it);
    }
}

/// A selector without a default constructor.
pub struct LockedSelector;

impl FileSelector for LockedSelector {
    fn pattern(&self) -> String {
        String::new()
    }
}

impl Configurable for LockedSelector {
    fn describe(ops: &mut Operations<Self>) {
        ops.implements::<dyn FileSelector>(|it| it);
    }
}

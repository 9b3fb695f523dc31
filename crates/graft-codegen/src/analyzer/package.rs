//! Package loading: manifest, library root and the module tree.

use crate::error::{CodegenError, Diagnostic, Result};
use crate::model::ModulePath;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use syn::ext::IdentExt;
use syn::{Attribute, Expr, Item, Lit, Meta, Visibility};
use tracing::{debug, trace};

/// What the analyzer needs from `Cargo.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Library crate name, as it is spelled in paths.
    pub crate_name: String,
    /// Library root relative to the manifest directory.
    pub lib_path: PathBuf,
    /// Dependencies by the name they are referenced as, mapped to the crate name.
    pub dependencies: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RawManifest {
    package: RawPackage,
    lib: Option<RawLib>,
    #[serde(default)]
    dependencies: BTreeMap<String, RawDependency>,
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawLib {
    name: Option<String>,
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDependency {
    Version(#[allow(dead_code)] String),
    Detailed { package: Option<String> },
}

fn crate_ident(name: &str) -> String {
    name.replace('-', "_")
}

impl Manifest {
    /// Parse manifest text; `path` is only used for error reporting.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let raw: RawManifest = toml::from_str(text).map_err(|source| CodegenError::Manifest {
            path: path.to_path_buf(),
            source,
        })?;

        let lib = raw.lib.unwrap_or(RawLib {
            name: None,
            path: None,
        });
        let crate_name = crate_ident(lib.name.as_deref().unwrap_or(&raw.package.name));
        let lib_path = PathBuf::from(lib.path.unwrap_or_else(|| "src/lib.rs".to_string()));

        let dependencies = raw
            .dependencies
            .into_iter()
            .map(|(key, dep)| {
                let target = match dep {
                    RawDependency::Detailed {
                        package: Some(package),
                    } => crate_ident(&package),
                    _ => crate_ident(&key),
                };
                (crate_ident(&key), target)
            })
            .collect();

        Ok(Self {
            crate_name,
            lib_path,
            dependencies,
        })
    }
}

/// One module of the package, inline or file backed.
#[derive(Debug, Clone)]
pub struct SourceModule {
    pub path: ModulePath,
    /// File the module's items were read from.
    pub file: PathBuf,
    pub items: Vec<Item>,
    /// Index of the parent module; `None` for the crate root.
    pub parent: Option<usize>,
    /// Reachable from outside the crate through public modules only.
    pub public: bool,
}

impl SourceModule {
    /// Name the parent module knows this module by.
    pub fn name(&self) -> Option<&str> {
        self.path.last()
    }
}

/// A loaded package: manifest plus every module reachable from the library root.
#[derive(Debug, Clone)]
pub struct Package {
    pub manifest: Manifest,
    pub dir: PathBuf,
    /// Modules in load order; index 0 is the crate root.
    pub modules: Vec<SourceModule>,
    /// Files that failed to parse.
    pub syntax_errors: Vec<Diagnostic>,
}

impl Package {
    /// Load the package at `path`, a crate directory or its `Cargo.toml`.
    pub fn load(path: &Path) -> Result<Self> {
        let manifest_path = if path.is_dir() {
            path.join("Cargo.toml")
        } else {
            path.to_path_buf()
        };
        if !manifest_path.is_file() {
            return Err(CodegenError::Load {
                path: path.to_path_buf(),
                reason: "no Cargo.toml found".to_string(),
            });
        }

        let text = fs::read_to_string(&manifest_path).map_err(|source| CodegenError::Read {
            path: manifest_path.clone(),
            source,
        })?;
        let manifest = Manifest::parse(&manifest_path, &text)?;
        let dir = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let root_file = dir.join(&manifest.lib_path);
        if !root_file.is_file() {
            return Err(CodegenError::Load {
                path: path.to_path_buf(),
                reason: format!("library root {} does not exist", root_file.display()),
            });
        }

        debug!(
            krate = %manifest.crate_name,
            root = %root_file.display(),
            "loading package"
        );

        let mut loader = Loader::default();
        let child_dir = root_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        loader.load_file(
            ModulePath::root(&manifest.crate_name),
            root_file,
            child_dir,
            None,
            true,
        )?;

        Ok(Self {
            manifest,
            dir,
            modules: loader.modules,
            syntax_errors: loader.syntax_errors,
        })
    }

    pub fn root(&self) -> &SourceModule {
        &self.modules[0]
    }
}

/// A `mod` item of a module being loaded.
struct ChildDecl {
    name: String,
    public: bool,
    path_attr: Option<String>,
    content: Option<Vec<Item>>,
}

#[derive(Default)]
struct Loader {
    modules: Vec<SourceModule>,
    syntax_errors: Vec<Diagnostic>,
}

impl Loader {
    fn load_file(
        &mut self,
        path: ModulePath,
        file: PathBuf,
        child_dir: PathBuf,
        parent: Option<usize>,
        public: bool,
    ) -> Result<()> {
        let source = fs::read_to_string(&file).map_err(|source| CodegenError::Read {
            path: file.clone(),
            source,
        })?;
        let items = match syn::parse_file(&source) {
            Ok(parsed) => parsed.items,
            Err(err) => {
                self.syntax_errors
                    .push(Diagnostic::new(&file, format!("syntax error: {err}")));
                Vec::new()
            }
        };
        self.add_module(path, file, items, child_dir, parent, public, false)
    }

    fn add_module(
        &mut self,
        path: ModulePath,
        file: PathBuf,
        mut items: Vec<Item>,
        child_dir: PathBuf,
        parent: Option<usize>,
        public: bool,
        inline: bool,
    ) -> Result<()> {
        let children: Vec<ChildDecl> = items
            .iter_mut()
            .filter_map(|item| match item {
                Item::Mod(decl) if !is_cfg_test(&decl.attrs) => Some(ChildDecl {
                    name: decl.ident.unraw().to_string(),
                    public: matches!(decl.vis, Visibility::Public(_)),
                    path_attr: path_attr(&decl.attrs),
                    content: decl.content.take().map(|(_, items)| items),
                }),
                _ => None,
            })
            .collect();

        trace!(module = %path, file = %file.display(), "loaded module");
        let index = self.modules.len();
        self.modules.push(SourceModule {
            path: path.clone(),
            file: file.clone(),
            items,
            parent,
            public,
        });

        for child in children {
            let child_path = path.child(&child.name);
            let child_public = public && child.public;
            match child.content {
                Some(items) => {
                    let dir = child_dir.join(&child.name);
                    self.add_module(
                        child_path,
                        file.clone(),
                        items,
                        dir,
                        Some(index),
                        child_public,
                        true,
                    )?;
                }
                None => {
                    let (child_file, dir) = locate(&file, &child_dir, inline, &child)?;
                    self.load_file(child_path, child_file, dir, Some(index), child_public)?;
                }
            }
        }
        Ok(())
    }
}

/// Find the file of an out-of-line module and the directory its own children live in.
///
/// A `#[path]` is relative to the declaring file's directory, or to the
/// module directory when declared inside an inline `mod` block.
fn locate(
    declared_in: &Path,
    child_dir: &Path,
    inline: bool,
    child: &ChildDecl,
) -> Result<(PathBuf, PathBuf)> {
    if let Some(relative) = &child.path_attr {
        let base = if inline {
            child_dir
        } else {
            declared_in.parent().unwrap_or_else(|| Path::new(""))
        };
        let file = base.join(relative);
        if file.is_file() {
            let dir = file.parent().map(Path::to_path_buf).unwrap_or_default();
            return Ok((file, dir));
        }
        return Err(missing_module(declared_in, &child.name, &[file]));
    }

    let flat = child_dir.join(format!("{}.rs", child.name));
    let nested = child_dir.join(&child.name).join("mod.rs");
    let dir = child_dir.join(&child.name);
    if flat.is_file() {
        Ok((flat, dir))
    } else if nested.is_file() {
        Ok((nested, dir))
    } else {
        Err(missing_module(declared_in, &child.name, &[flat, nested]))
    }
}

fn missing_module(declared_in: &Path, name: &str, tried: &[PathBuf]) -> CodegenError {
    let tried: Vec<String> = tried.iter().map(|p| p.display().to_string()).collect();
    CodegenError::Load {
        path: declared_in.to_path_buf(),
        reason: format!("module `{name}` not found (tried {})", tried.join(", ")),
    }
}

fn is_cfg_test(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("cfg")
            && matches!(&attr.meta, Meta::List(list) if list.tokens.to_string() == "test")
    })
}

fn path_attr(attrs: &[Attribute]) -> Option<String> {
    attrs.iter().find_map(|attr| match &attr.meta {
        Meta::NameValue(nv) if nv.path.is_ident("path") => match &nv.value {
            Expr::Lit(expr) => match &expr.lit {
                Lit::Str(lit) => Some(lit.value()),
                _ => None,
            },
            _ => None,
        },
        _ => None,
    })
}

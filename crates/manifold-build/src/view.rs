use crate::ArtifactBuilder;

///
/// PyModule
///
/// Minimal Python module tree: enough structure for generated view and
/// hook files, rendered by [`crate::render`].
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PyModule {
    pub docstring: Option<String>,
    pub imports: Vec<PyImport>,
    pub classes: Vec<PyClass>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PyImport {
    pub module: String,
    pub names: Vec<String>,
}

impl PyImport {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            names: vec![name.into()],
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PyClass {
    pub name: String,
    pub bases: Vec<String>,
    pub attrs: Vec<PyAssign>,
    pub methods: Vec<PyMethod>,
}

impl PyClass {
    pub fn new(name: impl Into<String>, bases: &[&str]) -> Self {
        Self {
            name: name.into(),
            bases: bases.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn attr(mut self, target: &str, value: PyExpr) -> Self {
        self.attrs.push(PyAssign {
            target: target.to_string(),
            value,
        });
        self
    }

    #[must_use]
    pub fn method(mut self, method: PyMethod) -> Self {
        self.methods.push(method);
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PyAssign {
    pub target: String,
    pub value: PyExpr,
}

///
/// PyMethod
/// body lines are plain statements, indented by the renderer
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PyMethod {
    pub name: String,
    pub params: Vec<String>,
    pub docstring: Option<String>,
    pub body: Vec<String>,
}

///
/// PyExpr
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PyExpr {
    /// identifier or dotted expression, emitted verbatim
    Name(String),
    Str(String),
    List(Vec<Self>),
}

impl PyExpr {
    pub fn name(s: impl Into<String>) -> Self {
        Self::Name(s.into())
    }

    pub fn str_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(|s| Self::Str(s.into())).collect())
    }
}

// generate
// viewset module for one entity
#[must_use]
pub fn generate(builder: &ArtifactBuilder) -> PyModule {
    let name = builder.type_name();
    let package = format!("{}_app", builder.app_id);
    let module_id = builder.module_id;
    let model_id = builder.model_id();
    let is_public = builder.entity.is_public;

    let mut imports = vec![
        PyImport::new("core.views.template", "GenericViewSet"),
        PyImport::new("core.permissions", "HasGroupPermission"),
    ];
    if is_public {
        imports.push(PyImport::new("rest_framework.permissions", "AllowAny"));
    }
    for (layer, suffix) in [("models", ""), ("filters", "Filter"), ("serializers", "Serializer")] {
        imports.push(PyImport::new(
            format!("{package}.{layer}.{module_id}.{model_id}"),
            format!("{name}{suffix}"),
        ));
    }

    let queryset = PyExpr::name(format!("{name}.objects.all()"));
    let serializer = PyExpr::name(format!("{name}Serializer"));

    let mut classes = vec![
        PyClass::new(builder.viewset_name(), &["GenericViewSet"])
            .attr("queryset", queryset.clone())
            .attr("filterset_class", PyExpr::name(format!("{name}Filter")))
            .attr(
                "permission_classes",
                PyExpr::List(vec![PyExpr::name("HasGroupPermission")]),
            )
            .attr("serializer_class", serializer.clone()),
    ];

    if is_public {
        classes.push(
            PyClass::new(builder.public_viewset_name(), &["GenericViewSet"])
                .attr("queryset", queryset)
                .attr("serializer_class", serializer)
                .attr(
                    "permission_classes",
                    PyExpr::List(vec![PyExpr::name("AllowAny")]),
                )
                .attr("http_method_names", PyExpr::str_list(["get"])),
        );
    }

    PyModule {
        docstring: None,
        imports,
        classes,
    }
}

///
/// TESTS
///

//! Known compiler directives and their value types

/// Expected value type of a directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Bool,
    Number,
    Str,
    /// A string resolved against the description's base path
    Path,
    Enum(&'static [&'static str]),
    List,
    /// A list of strings each resolved against the base path
    PathList,
    Object,
}

impl DirectiveKind {
    /// Type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::Str | Self::Path | Self::Enum(_) => "string",
            Self::List | Self::PathList => "Array",
            Self::Object => "object",
        }
    }
}

const TARGETS: &[&str] = &[
    "es3", "es5", "es6", "es2015", "es2016", "es2017", "es2018", "es2019", "es2020", "esnext",
];
const MODULES: &[&str] = &[
    "none", "commonjs", "amd", "system", "umd", "es6", "es2015", "esnext",
];
const JSX: &[&str] = &["preserve", "react", "react-native"];
const MODULE_RESOLUTION: &[&str] = &["node", "classic"];
const NEW_LINE: &[&str] = &["crlf", "lf"];

const DIRECTIVES: &[(&str, DirectiveKind)] = &[
    ("allowJs", DirectiveKind::Bool),
    ("allowSyntheticDefaultImports", DirectiveKind::Bool),
    ("allowUnreachableCode", DirectiveKind::Bool),
    ("alwaysStrict", DirectiveKind::Bool),
    ("baseUrl", DirectiveKind::Path),
    ("checkJs", DirectiveKind::Bool),
    ("composite", DirectiveKind::Bool),
    ("declaration", DirectiveKind::Bool),
    ("declarationDir", DirectiveKind::Path),
    ("declarationMap", DirectiveKind::Bool),
    ("downlevelIteration", DirectiveKind::Bool),
    ("emitDeclarationOnly", DirectiveKind::Bool),
    ("emitDecoratorMetadata", DirectiveKind::Bool),
    ("esModuleInterop", DirectiveKind::Bool),
    ("experimentalDecorators", DirectiveKind::Bool),
    ("forceConsistentCasingInFileNames", DirectiveKind::Bool),
    ("importHelpers", DirectiveKind::Bool),
    ("inlineSourceMap", DirectiveKind::Bool),
    ("inlineSources", DirectiveKind::Bool),
    ("isolatedModules", DirectiveKind::Bool),
    ("jsx", DirectiveKind::Enum(JSX)),
    ("jsxFactory", DirectiveKind::Str),
    ("lib", DirectiveKind::List),
    ("mapRoot", DirectiveKind::Str),
    ("maxNodeModuleJsDepth", DirectiveKind::Number),
    ("module", DirectiveKind::Enum(MODULES)),
    ("moduleResolution", DirectiveKind::Enum(MODULE_RESOLUTION)),
    ("newLine", DirectiveKind::Enum(NEW_LINE)),
    ("noEmit", DirectiveKind::Bool),
    ("noEmitHelpers", DirectiveKind::Bool),
    ("noEmitOnError", DirectiveKind::Bool),
    ("noImplicitAny", DirectiveKind::Bool),
    ("noImplicitReturns", DirectiveKind::Bool),
    ("noImplicitThis", DirectiveKind::Bool),
    ("noLib", DirectiveKind::Bool),
    ("noUnusedLocals", DirectiveKind::Bool),
    ("noUnusedParameters", DirectiveKind::Bool),
    ("out", DirectiveKind::Path),
    ("outDir", DirectiveKind::Path),
    ("outFile", DirectiveKind::Path),
    ("paths", DirectiveKind::Object),
    ("preserveConstEnums", DirectiveKind::Bool),
    ("removeComments", DirectiveKind::Bool),
    ("resolveJsonModule", DirectiveKind::Bool),
    ("rootDir", DirectiveKind::Path),
    ("rootDirs", DirectiveKind::PathList),
    ("skipLibCheck", DirectiveKind::Bool),
    ("sourceMap", DirectiveKind::Bool),
    ("sourceRoot", DirectiveKind::Str),
    ("strict", DirectiveKind::Bool),
    ("strictBindCallApply", DirectiveKind::Bool),
    ("strictFunctionTypes", DirectiveKind::Bool),
    ("strictNullChecks", DirectiveKind::Bool),
    ("strictPropertyInitialization", DirectiveKind::Bool),
    ("stripInternal", DirectiveKind::Bool),
    ("suppressImplicitAnyIndexErrors", DirectiveKind::Bool),
    ("target", DirectiveKind::Enum(TARGETS)),
    ("typeRoots", DirectiveKind::PathList),
    ("types", DirectiveKind::List),
];

/// Look up the value type of a directive by its exact name.
pub fn directive_kind(name: &str) -> Option<DirectiveKind> {
    DIRECTIVES
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, kind)| *kind)
}

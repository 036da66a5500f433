//! The plugin's configuration surface: property keys, NullAway options and
//! the property definitions registered with the host.

pub const MAVEN_WORK_OFFLINE: &str = "erroraway.maven.work.offline";
pub const MAVEN_USER_SETTINGS_FILE: &str = "erroraway.maven.user.settings.file";
pub const MAVEN_LOCAL_REPOSITORY: &str = "erroraway.maven.local.repository";
pub const MAVEN_USE_TEMP_LOCAL_REPOSITORY: &str = "erroraway.maven.use.temp.local.repository";
pub const MAVEN_REPOSITORIES: &str = "erroraway.maven.repositories";
pub const CLASS_PATH_MAVEN_COORDINATES: &str = "erroraway.classpath.maven.coordinates";
pub const ANNOTATION_PROCESSORS_MAVEN_COORDINATES: &str =
    "erroraway.annotation.processors.maven.coordinates";

const PROPERTY_ERRORAWAY_CATEGORY: &str = "ErrorAway";
const PROPERTY_NULLAWAY_CATEGORY: &str = "NullAway";
const PROPERTY_MAVEN_SUBCATEGORY: &str = "Maven";

/// NullAway configuration options, forwarded to the checker as
/// `-XepOpt:NullAway:<Option>=<comma-joined values>` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullAwayOption {
    AnnotatedPackages,
    UnannotatedPackages,
    UnannotatedClasses,
    KnownInitializers,
    ExcludedFieldAnnotations,
}

impl NullAwayOption {
    pub const ALL: [NullAwayOption; 5] = [
        NullAwayOption::AnnotatedPackages,
        NullAwayOption::UnannotatedPackages,
        NullAwayOption::UnannotatedClasses,
        NullAwayOption::KnownInitializers,
        NullAwayOption::ExcludedFieldAnnotations,
    ];

    /// The option name NullAway itself understands.
    pub fn errorprone_option(self) -> &'static str {
        match self {
            NullAwayOption::AnnotatedPackages => "AnnotatedPackages",
            NullAwayOption::UnannotatedPackages => "UnannotatedSubPackages",
            NullAwayOption::UnannotatedClasses => "UnannotatedClasses",
            NullAwayOption::KnownInitializers => "KnownInitializers",
            NullAwayOption::ExcludedFieldAnnotations => "ExcludedFieldAnnotations",
        }
    }

    /// The host configuration key.
    pub fn key(self) -> &'static str {
        match self {
            NullAwayOption::AnnotatedPackages => "nullaway.annotated.packages",
            NullAwayOption::UnannotatedPackages => "nullaway.unannotated.packages",
            NullAwayOption::UnannotatedClasses => "nullaway.unannotated.classes",
            NullAwayOption::KnownInitializers => "nullaway.known.initializers",
            NullAwayOption::ExcludedFieldAnnotations => "nullaway.field.annotations",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NullAwayOption::AnnotatedPackages => "Annotated Packages",
            NullAwayOption::UnannotatedPackages => "Unannotated Packages",
            NullAwayOption::UnannotatedClasses => "Unannotated Classes",
            NullAwayOption::KnownInitializers => "Known Initializers",
            NullAwayOption::ExcludedFieldAnnotations => "Excluded Field Annotations",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            NullAwayOption::AnnotatedPackages => "The list of annotated packages for NullAway",
            NullAwayOption::UnannotatedPackages => {
                "The list of unannotated packages to be excluded from the annotated package list for NullAway"
            }
            NullAwayOption::UnannotatedClasses => {
                "The list of classes within annotated packages to be treated as unannotated for NullAway"
            }
            NullAwayOption::KnownInitializers => {
                "The fully qualified names of methods that NullAway should treat as initializers"
            }
            NullAwayOption::ExcludedFieldAnnotations => {
                "A list of annotations that cause fields to be excluded from being checked for proper initialization"
            }
        }
    }
}

/// A property definition handed to the host at plugin registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDefinition {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: &'static str,
    pub sub_category: Option<&'static str>,
    pub multi_values: bool,
    pub boolean: bool,
}

/// Every property the plugin declares, in registration order.
pub fn plugin_properties() -> Vec<PropertyDefinition> {
    let mut properties = vec![
        PropertyDefinition {
            key: MAVEN_WORK_OFFLINE,
            name: "Maven offline",
            description: "Let Maven work offline",
            category: PROPERTY_ERRORAWAY_CATEGORY,
            sub_category: Some(PROPERTY_MAVEN_SUBCATEGORY),
            multi_values: false,
            boolean: true,
        },
        PropertyDefinition {
            key: MAVEN_USER_SETTINGS_FILE,
            name: "Maven user settings file",
            description: "The maven user settings file, e.g. C:/Users/jdoe/.m2/settings.xml",
            category: PROPERTY_ERRORAWAY_CATEGORY,
            sub_category: Some(PROPERTY_MAVEN_SUBCATEGORY),
            multi_values: false,
            boolean: false,
        },
        PropertyDefinition {
            key: MAVEN_LOCAL_REPOSITORY,
            name: "Maven local repository",
            description: "The maven local repository, e.g. C:/Users/jdoe/.m2/repository",
            category: PROPERTY_ERRORAWAY_CATEGORY,
            sub_category: Some(PROPERTY_MAVEN_SUBCATEGORY),
            multi_values: false,
            boolean: false,
        },
        PropertyDefinition {
            key: MAVEN_USE_TEMP_LOCAL_REPOSITORY,
            name: "Use Maven temporary local repository",
            description: "Use a temporary folder for the Maven local repository",
            category: PROPERTY_ERRORAWAY_CATEGORY,
            sub_category: Some(PROPERTY_MAVEN_SUBCATEGORY),
            multi_values: false,
            boolean: true,
        },
        PropertyDefinition {
            key: MAVEN_REPOSITORIES,
            name: "Maven repositories",
            description: "The maven remote repositories, e.g. https://repo1.maven.org/maven2/",
            category: PROPERTY_ERRORAWAY_CATEGORY,
            sub_category: Some(PROPERTY_MAVEN_SUBCATEGORY),
            multi_values: true,
            boolean: false,
        },
        PropertyDefinition {
            key: CLASS_PATH_MAVEN_COORDINATES,
            name: "Classpath Maven coordinates",
            description: "The maven coordinates of dependencies required to compile the project, e.g. org.slf4j:slf4j-api:1.7.36",
            category: PROPERTY_ERRORAWAY_CATEGORY,
            sub_category: Some(PROPERTY_MAVEN_SUBCATEGORY),
            multi_values: true,
            boolean: false,
        },
        PropertyDefinition {
            key: ANNOTATION_PROCESSORS_MAVEN_COORDINATES,
            name: "Annotation processors Maven coordinates",
            description: "The maven coordinates of annotation processors, e.g. com.google.auto.value:auto-value:1.9",
            category: PROPERTY_ERRORAWAY_CATEGORY,
            sub_category: Some(PROPERTY_MAVEN_SUBCATEGORY),
            multi_values: true,
            boolean: false,
        },
    ];

    for option in NullAwayOption::ALL {
        properties.push(PropertyDefinition {
            key: option.key(),
            name: option.name(),
            description: option.description(),
            category: PROPERTY_NULLAWAY_CATEGORY,
            sub_category: None,
            multi_values: true,
            boolean: false,
        });
    }

    properties
}

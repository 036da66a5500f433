//! Maven artifact resolution for the extra classpath and annotation
//! processor jars.
//!
//! The contract is deliberately small: given coordinates, return local file
//! paths. Artifacts already present in the local repository are used as-is;
//! missing ones are fetched from the configured remote repositories unless
//! offline mode is set. Results are cached for the lifetime of one manager
//! instance, which the sensor scopes to a single analysis run.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{
    MAVEN_LOCAL_REPOSITORY, MAVEN_REPOSITORIES, MAVEN_USER_SETTINGS_FILE,
    MAVEN_USE_TEMP_LOCAL_REPOSITORY, MAVEN_WORK_OFFLINE,
};
use crate::host::{Configuration, TempFolder};
use crate::{PluginError, Result};

/// `group:artifact:version[:classifier]` coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MavenCoordinates {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: Option<String>,
}

impl FromStr for MavenCoordinates {
    type Err = PluginError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [group_id, artifact_id, version] => Ok(Self {
                group_id: group_id.to_string(),
                artifact_id: artifact_id.to_string(),
                version: version.to_string(),
                classifier: None,
            }),
            [group_id, artifact_id, version, classifier] => Ok(Self {
                group_id: group_id.to_string(),
                artifact_id: artifact_id.to_string(),
                version: version.to_string(),
                classifier: Some(classifier.to_string()),
            }),
            _ => Err(PluginError::Configuration(format!(
                "invalid maven coordinates `{s}`, expected group:artifact:version[:classifier]"
            ))),
        }
    }
}

impl fmt::Display for MavenCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        Ok(())
    }
}

impl MavenCoordinates {
    /// Path of the artifact's jar below a repository root, using the
    /// standard repository layout.
    pub fn jar_path(&self, repository: &Path) -> PathBuf {
        let group_path = self.group_id.replace('.', "/");
        let file_name = match &self.classifier {
            Some(classifier) => {
                format!("{}-{}-{classifier}.jar", self.artifact_id, self.version)
            }
            None => format!("{}-{}.jar", self.artifact_id, self.version),
        };

        repository
            .join(group_path)
            .join(&self.artifact_id)
            .join(&self.version)
            .join(file_name)
    }

    fn remote_url(&self, repository: &str) -> String {
        let group_path = self.group_id.replace('.', "/");
        let file_name = match &self.classifier {
            Some(classifier) => {
                format!("{}-{}-{classifier}.jar", self.artifact_id, self.version)
            }
            None => format!("{}-{}.jar", self.artifact_id, self.version),
        };

        format!(
            "{}/{group_path}/{}/{}/{file_name}",
            repository.trim_end_matches('/'),
            self.artifact_id,
            self.version
        )
    }
}

pub struct DependencyManager {
    work_offline: bool,
    local_repository: PathBuf,
    remote_repositories: Vec<String>,
    cache: HashMap<String, PathBuf>,
    client: reqwest::blocking::Client,
}

impl DependencyManager {
    pub fn new(temp_folder: &dyn TempFolder, configuration: &dyn Configuration) -> Result<Self> {
        let work_offline = configuration.get_bool(MAVEN_WORK_OFFLINE).unwrap_or(false);
        let local_repository = local_repository(temp_folder, configuration)?;
        let remote_repositories = configuration.get_string_array(MAVEN_REPOSITORIES);

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| PluginError::Configuration(format!("error creating http client: {e}")))?;

        debug!(
            "dependency manager using local repository {} (offline: {work_offline})",
            local_repository.display()
        );

        Ok(Self {
            work_offline,
            local_repository,
            remote_repositories,
            cache: HashMap::new(),
            client,
        })
    }

    /// Resolves every coordinate to a local jar path, downloading when
    /// needed. Any unresolvable coordinate fails the whole call.
    pub fn download_dependencies(&mut self, coordinates: &[String]) -> Result<Vec<PathBuf>> {
        coordinates
            .iter()
            .map(|c| self.resolve_artifact(c))
            .collect()
    }

    fn resolve_artifact(&mut self, coordinates: &str) -> Result<PathBuf> {
        if let Some(path) = self.cache.get(coordinates) {
            return Ok(path.clone());
        }

        let parsed: MavenCoordinates = coordinates.parse()?;
        let local_path = parsed.jar_path(&self.local_repository);

        if local_path.is_file() {
            debug!("{parsed} already present at {}", local_path.display());
            self.cache.insert(coordinates.to_string(), local_path.clone());
            return Ok(local_path);
        }

        if self.work_offline {
            return Err(self.resolution_error(coordinates));
        }

        for repository in &self.remote_repositories {
            let url = parsed.remote_url(repository);
            match fetch(&self.client, &url, &local_path) {
                Ok(()) => {
                    info!("downloaded {parsed} from {repository}");
                    self.cache.insert(coordinates.to_string(), local_path.clone());
                    return Ok(local_path);
                }
                Err(e) => warn!("could not fetch {url}: {e}"),
            }
        }

        Err(self.resolution_error(coordinates))
    }

    fn resolution_error(&self, coordinates: &str) -> PluginError {
        PluginError::DependencyResolution {
            coordinates: coordinates.to_string(),
            repositories: self.remote_repositories.join(", "),
        }
    }
}

fn fetch(client: &reqwest::blocking::Client, url: &str, target: &Path) -> std::io::Result<()> {
    let response = client
        .get(url)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .map_err(std::io::Error::other)?;

    let bytes = response.bytes().map_err(std::io::Error::other)?;

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(target, &bytes)
}

/// Local repository resolution order: explicit configuration, a fresh temp
/// directory when requested, the user settings file, then `~/.m2/repository`.
fn local_repository(
    temp_folder: &dyn TempFolder,
    configuration: &dyn Configuration,
) -> Result<PathBuf> {
    if let Some(path) = configuration.get(MAVEN_LOCAL_REPOSITORY) {
        return Ok(PathBuf::from(path));
    }

    if configuration.get_bool(MAVEN_USE_TEMP_LOCAL_REPOSITORY).unwrap_or(false) {
        return temp_folder
            .new_dir("repository")
            .map_err(|e| PluginError::Configuration(format!("error creating temporary local repository: {e}")));
    }

    if let Some(path) = settings_local_repository(configuration)? {
        return Ok(path);
    }

    Ok(default_local_repository())
}

/// Reads `<localRepository>` from the user settings file, when the file
/// exists. An unreadable or invalid settings file is a configuration error.
fn settings_local_repository(configuration: &dyn Configuration) -> Result<Option<PathBuf>> {
    let settings_file = match configuration.get(MAVEN_USER_SETTINGS_FILE) {
        Some(path) => PathBuf::from(path),
        None => match home_dir() {
            Some(home) => home.join(".m2/settings.xml"),
            None => return Ok(None),
        },
    };

    if !settings_file.is_file() {
        return Ok(None);
    }

    let contents = fs::read_to_string(&settings_file).map_err(|e| {
        PluginError::Configuration(format!(
            "error reading settings from {}: {e}",
            settings_file.display()
        ))
    })?;

    let document = roxmltree::Document::parse(&contents).map_err(|e| {
        PluginError::Configuration(format!(
            "error parsing settings from {}: {e}",
            settings_file.display()
        ))
    })?;

    let local_repository = document
        .descendants()
        .find(|node| node.has_tag_name("localRepository"))
        .and_then(|node| node.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(PathBuf::from);

    Ok(local_repository)
}

fn default_local_repository() -> PathBuf {
    match home_dir() {
        Some(home) => home.join(".m2/repository"),
        None => PathBuf::from(".m2/repository"),
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MapConfiguration;

    struct NoTemp;
    impl TempFolder for NoTemp {
        fn new_dir(&self, _name: &str) -> std::io::Result<PathBuf> {
            panic!("temp folder must not be used")
        }
    }

    #[test]
    fn parses_coordinates() {
        let c: MavenCoordinates = "org.slf4j:slf4j-api:1.7.36".parse().unwrap();
        assert_eq!(c.group_id, "org.slf4j");
        assert_eq!(c.artifact_id, "slf4j-api");
        assert_eq!(c.version, "1.7.36");
        assert_eq!(c.classifier, None);

        let c: MavenCoordinates = "com.acme:thing:2.0:sources".parse().unwrap();
        assert_eq!(c.classifier.as_deref(), Some("sources"));
    }

    #[test]
    fn rejects_malformed_coordinates() {
        assert!("org.slf4j".parse::<MavenCoordinates>().is_err());
        assert!("a:b:c:d:e".parse::<MavenCoordinates>().is_err());
    }

    #[test]
    fn jar_path_uses_the_standard_repository_layout() {
        let c: MavenCoordinates = "org.slf4j:slf4j-api:1.7.36".parse().unwrap();
        assert_eq!(
            c.jar_path(Path::new("/repo")),
            Path::new("/repo/org/slf4j/slf4j-api/1.7.36/slf4j-api-1.7.36.jar")
        );
    }

    #[test]
    fn remote_url_joins_repository_and_layout() {
        let c: MavenCoordinates = "org.slf4j:slf4j-api:1.7.36".parse().unwrap();
        assert_eq!(
            c.remote_url("https://repo1.maven.org/maven2/"),
            "https://repo1.maven.org/maven2/org/slf4j/slf4j-api/1.7.36/slf4j-api-1.7.36.jar"
        );
    }

    #[test]
    fn configured_local_repository_wins() {
        let mut config = MapConfiguration::default();
        config.set(MAVEN_LOCAL_REPOSITORY, "/custom/repo");

        let path = local_repository(&NoTemp, &config).unwrap();
        assert_eq!(path, Path::new("/custom/repo"));
    }

    #[test]
    fn settings_file_local_repository_is_honored() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = tmp.path().join("settings.xml");
        fs::write(
            &settings,
            "<settings><localRepository>/from/settings</localRepository></settings>",
        )
        .unwrap();

        let mut config = MapConfiguration::default();
        config.set(MAVEN_USER_SETTINGS_FILE, settings.display().to_string());

        let path = local_repository(&NoTemp, &config).unwrap();
        assert_eq!(path, Path::new("/from/settings"));
    }

    #[test]
    fn invalid_settings_file_is_a_configuration_error() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = tmp.path().join("settings.xml");
        fs::write(&settings, "<settings><localRepository>").unwrap();

        let mut config = MapConfiguration::default();
        config.set(MAVEN_USER_SETTINGS_FILE, settings.display().to_string());

        assert!(matches!(
            local_repository(&NoTemp, &config).unwrap_err(),
            PluginError::Configuration(_)
        ));
    }

    #[test]
    fn offline_miss_fails_with_the_coordinates() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = MapConfiguration::default();
        config.set(MAVEN_WORK_OFFLINE, "true");
        config.set(MAVEN_LOCAL_REPOSITORY, tmp.path().display().to_string());

        let mut manager = DependencyManager::new(&NoTemp, &config).unwrap();
        let err = manager
            .download_dependencies(&["org.slf4j:slf4j-api:1.7.36".to_string()])
            .unwrap_err();
        assert!(err.to_string().contains("org.slf4j:slf4j-api:1.7.36"));
    }

    #[test]
    fn local_hit_is_returned_and_cached() {
        let tmp = tempfile::tempdir().unwrap();
        let coordinates: MavenCoordinates = "org.slf4j:slf4j-api:1.7.36".parse().unwrap();
        let jar = coordinates.jar_path(tmp.path());
        fs::create_dir_all(jar.parent().unwrap()).unwrap();
        fs::write(&jar, b"jar bytes").unwrap();

        let mut config = MapConfiguration::default();
        config.set(MAVEN_WORK_OFFLINE, "true");
        config.set(MAVEN_LOCAL_REPOSITORY, tmp.path().display().to_string());

        let mut manager = DependencyManager::new(&NoTemp, &config).unwrap();
        let paths = manager
            .download_dependencies(&["org.slf4j:slf4j-api:1.7.36".to_string()])
            .unwrap();
        assert_eq!(paths, vec![jar.clone()]);

        // Second resolution hits the per-run cache.
        let paths = manager
            .download_dependencies(&["org.slf4j:slf4j-api:1.7.36".to_string()])
            .unwrap();
        assert_eq!(paths, vec![jar]);
    }
}

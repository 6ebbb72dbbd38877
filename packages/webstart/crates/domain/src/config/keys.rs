//! Configuration keys shared by the bootstrap, the runtime manager and the CLI.

pub const DEFAULT_DOWNLOAD_SERVER: &str = "webstart.jvm.manager.server.default";
pub const ALLOW_DOWNLOAD_SERVER_FROM_DESCRIPTOR: &str = "webstart.jvm.manager.server.allowFromJnlp";
pub const JVM_VENDOR: &str = "webstart.jvm.manager.vendor";
pub const JVM_UPDATE_STRATEGY: &str = "webstart.jvm.manager.updateStrategy";
pub const JVM_SUPPORTED_VERSION_RANGE: &str = "webstart.jvm.manager.versionRange";

pub const PROXY_HTTP_HOST: &str = "deployment.proxy.http.host";
pub const PROXY_HTTP_PORT: &str = "deployment.proxy.http.port";
pub const PROXY_BYPASS_LOCAL: &str = "deployment.proxy.bypass.local";
pub const PROXY_TYPE: &str = "deployment.proxy.type";
pub const PROXY_AUTO_CONFIG_URL: &str = "deployment.proxy.auto.config.url";

pub const CACHE_MAX_SIZE: &str = "deployment.cache.max.size";
pub const CACHE_COMPRESSION_ENABLED: &str = "deployment.cache.jarcompression";
pub const HTTPS_DONT_ENFORCE: &str = "deployment.https.noenforce";
pub const ASSUME_FILE_STEM_IN_CODEBASE: &str = "deployment.assumeFileStemInCodebase";
pub const SECURITY_SERVER_WHITELIST: &str = "deployment.security.whitelist";

pub const CHECK_FOR_UPDATE: &str = "webstart.update.checkOnStartup";
pub const CHECK_FOR_UPDATE_NOW: &str = "webstart.update.checkNow";
pub const UPDATE_STRATEGY_SETTINGS: &str = "webstart.update.strategy.settings";
pub const UPDATE_STRATEGY_LAUNCH: &str = "webstart.update.strategy.launch";

/// Entry arguments handed to the runtime before the application arguments.
pub const LAUNCHER_ENTRY: &str = "webstart.launcher.entry";

/// Bootstrap bookkeeping; never imported from the installer.
pub const LAST_BOOTSTRAP_KEY: &str = "lastBootstrapTimestamp";

/// Keys copied from the installer on the first start after an installation.
pub const IMPORTED_KEYS: [&str; 19] = [
    DEFAULT_DOWNLOAD_SERVER,
    ALLOW_DOWNLOAD_SERVER_FROM_DESCRIPTOR,
    JVM_VENDOR,
    JVM_UPDATE_STRATEGY,
    JVM_SUPPORTED_VERSION_RANGE,
    PROXY_HTTP_HOST,
    PROXY_HTTP_PORT,
    PROXY_BYPASS_LOCAL,
    PROXY_TYPE,
    PROXY_AUTO_CONFIG_URL,
    CACHE_MAX_SIZE,
    CACHE_COMPRESSION_ENABLED,
    HTTPS_DONT_ENFORCE,
    ASSUME_FILE_STEM_IN_CODEBASE,
    SECURITY_SERVER_WHITELIST,
    CHECK_FOR_UPDATE,
    CHECK_FOR_UPDATE_NOW,
    UPDATE_STRATEGY_SETTINGS,
    UPDATE_STRATEGY_LAUNCH,
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_imported_keys_are_unique_and_exclude_bookkeeping() {
        let unique: HashSet<_> = IMPORTED_KEYS.iter().collect();
        assert_eq!(unique.len(), IMPORTED_KEYS.len());
        assert!(!IMPORTED_KEYS.contains(&LAST_BOOTSTRAP_KEY));
    }
}

//! Rendered production-settings block
//!
//! The block is wrapped in a verbatim begin/end sentinel pair. The sentinels
//! are owned by shipwright: everything between them is machine-generated and
//! safe to regenerate; hand edits inside the block do not survive a run.

use crate::config::{DeployConfig, PLATFORM_DOMAIN};

/// First line of the managed block, stored verbatim in the settings file
pub const BLOCK_BEGIN: &str = "# >>> shipwright production settings >>>";

/// Last line of the managed block
pub const BLOCK_END: &str = "# <<< shipwright production settings <<<";

/// Production settings rendered for one hosting account
#[derive(Debug, Clone)]
pub struct ProductionBlock {
    host: String,
}

impl ProductionBlock {
    pub fn from_config(config: &DeployConfig) -> Self {
        Self {
            host: config.host(),
        }
    }

    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }

    /// Render the full block including both sentinels, no trailing newline.
    ///
    /// The deployed application evaluates the host conditional at request
    /// time; the engine only emits it.
    pub fn render(&self) -> String {
        let host = &self.host;
        format!(
            r#"{BLOCK_BEGIN}
# Managed by shipwright; edits inside this block are overwritten on deploy.
ON_PRODUCTION_HOST = '{PLATFORM_DOMAIN}' in os.environ.get('HTTP_HOST', '')
if ON_PRODUCTION_HOST:
    DEBUG = False
    ALLOWED_HOSTS = [
        '{host}',
        'www.{host}',
    ]
    CORS_ALLOWED_ORIGINS = [
        "https://{host}",
    ]
    CSRF_TRUSTED_ORIGINS = [
        "https://{host}",
    ]
    LOGGING = {{
        'version': 1,
        'disable_existing_loggers': False,
        'handlers': {{
            'file': {{
                'level': 'ERROR',
                'class': 'logging.FileHandler',
                'filename': os.path.join(BASE_DIR, 'django_errors.log'),
            }},
        }},
        'loggers': {{
            'django': {{
                'handlers': ['file'],
                'level': 'ERROR',
                'propagate': True,
            }},
        }},
    }}
{BLOCK_END}"#
        )
    }
}

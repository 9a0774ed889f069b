use url::Url;

/// Known iHealth OpenAPI endpoints, identified by the file name at the end of
/// the request URL (`weight.json`, `bp.xml`, ...). Anything else is served by
/// [`ServiceVendor::UserInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ServiceVendor {
    BloodPressure,
    Weight,
    Glucose,
    SpO2,
    Activity,
    Sleep,
    #[default]
    UserInfo,
}

impl ServiceVendor {
    pub const ALL: [ServiceVendor; 7] = [
        ServiceVendor::BloodPressure,
        ServiceVendor::Weight,
        ServiceVendor::Glucose,
        ServiceVendor::SpO2,
        ServiceVendor::Activity,
        ServiceVendor::Sleep,
        ServiceVendor::UserInfo,
    ];

    /// Key of this service in the config's `sv` map.
    pub fn config_key(self) -> &'static str {
        match self {
            ServiceVendor::BloodPressure => "OpenApiBP",
            ServiceVendor::Weight => "OpenApiWeight",
            ServiceVendor::Glucose => "OpenApiBG",
            ServiceVendor::SpO2 => "OpenApiSpO2",
            ServiceVendor::Activity => "OpenApiActivity",
            ServiceVendor::Sleep => "OpenApiSleep",
            ServiceVendor::UserInfo => "OpenApiUserInfo",
        }
    }

    /// Exact match on `<name>.json` / `<name>.xml`.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (stem, extension) = file_name.rsplit_once('.')?;
        if extension != "json" && extension != "xml" {
            return None;
        }
        match stem {
            "bp" => Some(ServiceVendor::BloodPressure),
            "weight" => Some(ServiceVendor::Weight),
            "glucose" => Some(ServiceVendor::Glucose),
            "spo2" => Some(ServiceVendor::SpO2),
            "activity" => Some(ServiceVendor::Activity),
            "sleep" => Some(ServiceVendor::Sleep),
            "userinfo" => Some(ServiceVendor::UserInfo),
            _ => None,
        }
    }

    /// Service addressed by `url`, falling back to the default on unknown endpoints.
    pub fn for_url(url: &str) -> Self {
        last_path_segment(url)
            .as_deref()
            .and_then(Self::from_file_name)
            .unwrap_or_default()
    }
}

fn last_path_segment(url: &str) -> Option<String> {
    match Url::parse(url) {
        Ok(parsed) => parsed.path_segments()?.last().map(str::to_owned),
        Err(_) => {
            let path = url.split(['?', '#']).next().unwrap_or(url);
            path.rsplit('/').next().map(str::to_owned)
        }
    }
}

use std::time::Duration;

use chrono::Utc;
use parking_lot::Mutex;
use reqwest::{header, multipart, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use torrent_meta::Magnet;

use crate::{
    config::Config,
    error::{Error, Result},
    normalize::{normalize_torrent_data, AllClientData, NormalizedTorrent},
    request::{AddTorrentOptions, RssFeedUpdate, TorrentFile, TorrentSource},
    response::{
        BaseResponse, RssUpdateResponse, SettingsResponse, TorrentListResponse, VersionResponse,
    },
    session::{extract_token, Credentials, Session, SessionCookie},
};

/// Client of the legacy `/gui/` web API.
///
/// Logs in lazily on the first call and again whenever the session cookie
/// is about to expire. Can be shared between tasks behind an `Arc`.
pub struct UtClient {
    inner: Client,
    config: Config,
    session: Mutex<Session>,
    /// Held for the duration of a login so concurrent callers share it.
    login_lock: tokio::sync::Mutex<()>,
}

impl UtClient {
    fn url(&self, file: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let path = self.config.path.trim_matches('/');
        if path.is_empty() {
            format!("{base}/{file}")
        } else {
            format!("{base}/{path}/{file}")
        }
    }

    /// Does not touch the network; the first request logs in.
    pub fn new(config: Config) -> Result<Self> {
        let mut client_builder =
            reqwest::ClientBuilder::new().timeout(Duration::from_millis(config.timeout_ms));
        if let Some(proxy) = &config.proxy {
            debug!("setting request client proxy to {:?}", proxy);
            client_builder = client_builder.proxy(reqwest::Proxy::all(proxy)?);
        }
        let client = client_builder.build()?;
        Ok(Self {
            inner: client,
            config,
            session: Mutex::new(Session::default()),
            login_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.lock().is_authenticated()
    }

    /// Current token, mostly useful for debugging.
    pub fn token(&self) -> Option<String> {
        self.session.lock().token().map(str::to_string)
    }

    pub fn reset_session(&self) {
        self.session.lock().reset();
        debug!("session reset");
    }

    /// Fetches a fresh token and cookie. One attempt, no retry.
    pub async fn connect(&self) -> Result<()> {
        let _guard = self.login_lock.lock().await;
        self.login().await.map(|_| ())
    }

    async fn login(&self) -> Result<Credentials> {
        let url = self.url("token.html");
        debug!("fetching token from {url}");
        let response = self
            .inner
            .get(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .query(&[("t", Utc::now().timestamp_millis().to_string())])
            .send()
            .await?;
        let response = check_status("login", response)?;

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| SessionCookie::parse(s, Utc::now()));
        if cookie.is_none() {
            debug!("token response carried no usable cookie");
        }
        let body = response.text().await?;
        let token = extract_token(&body).ok_or(Error::Authentication)?.to_string();

        let credentials = Credentials {
            token: token.clone(),
            cookie: cookie.as_ref().map(SessionCookie::header_value),
        };
        self.session.lock().establish(token, cookie);
        info!("client logged in.");
        Ok(credentials)
    }

    fn fresh_credentials(&self) -> Option<Credentials> {
        let mut session = self.session.lock();
        if session.expire_stale(Utc::now()) {
            info!("session cookie about to expire, logging in again");
        }
        session.credentials()
    }

    async fn ensure_authenticated(&self) -> Result<Credentials> {
        if let Some(credentials) = self.fresh_credentials() {
            return Ok(credentials);
        }
        let _guard = self.login_lock.lock().await;
        // whoever held the lock before us may have logged in already
        if let Some(credentials) = self.fresh_credentials() {
            return Ok(credentials);
        }
        self.login().await
    }

    fn authorize(&self, builder: RequestBuilder, credentials: &Credentials) -> RequestBuilder {
        let builder = builder.basic_auth(&self.config.username, Some(&self.config.password));
        match &credentials.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie.as_str()),
            None => builder,
        }
    }

    /// Runs one action against the web API. An empty `action` is sent
    /// without the `action` parameter, which is how listing works.
    pub async fn request<T: DeserializeOwned>(
        &self,
        action: &str,
        mut params: Vec<(&str, String)>,
    ) -> Result<T> {
        let credentials = self.ensure_authenticated().await?;
        params.push(("token", credentials.token.clone()));
        if !action.is_empty() {
            params.push(("action", action.to_string()));
        }

        let url = self.url("");
        debug!("request action={:?} url={url}", action_name(action));
        let response = self
            .authorize(self.inner.get(&url), &credentials)
            .query(&params)
            .send()
            .await?;
        let response = check_status(action_name(action), response)?;
        Ok(response.json::<T>().await?)
    }

    async fn hash_action(&self, action: &str, hash: &str) -> Result<BaseResponse> {
        self.request(action, vec![("hash", hash.to_string())]).await
    }

    pub async fn get_settings(&self) -> Result<SettingsResponse> {
        self.request("getsettings", vec![]).await
    }

    pub async fn get_version(&self) -> Result<VersionResponse> {
        self.request("getversion", vec![]).await
    }

    pub async fn start_torrent(&self, hash: &str) -> Result<BaseResponse> {
        self.hash_action("start", hash).await
    }

    pub async fn unpause(&self, hash: &str) -> Result<BaseResponse> {
        self.hash_action("unpause", hash).await
    }

    /// Alias of [`UtClient::unpause`]
    pub async fn resume_torrent(&self, hash: &str) -> Result<BaseResponse> {
        self.unpause(hash).await
    }

    pub async fn force_start_torrent(&self, hash: &str) -> Result<BaseResponse> {
        self.hash_action("forcestart", hash).await
    }

    pub async fn pause_torrent(&self, hash: &str) -> Result<BaseResponse> {
        self.hash_action("pause", hash).await
    }

    pub async fn stop_torrent(&self, hash: &str) -> Result<BaseResponse> {
        self.hash_action("stop", hash).await
    }

    pub async fn queue_up(&self, hash: &str) -> Result<BaseResponse> {
        self.hash_action("queueup", hash).await
    }

    pub async fn queue_down(&self, hash: &str) -> Result<BaseResponse> {
        self.hash_action("queuedown", hash).await
    }

    pub async fn queue_top(&self, hash: &str) -> Result<BaseResponse> {
        self.hash_action("queuetop", hash).await
    }

    pub async fn queue_bottom(&self, hash: &str) -> Result<BaseResponse> {
        self.hash_action("queuebottom", hash).await
    }

    /// `remove_data` also deletes the downloaded files.
    pub async fn remove_torrent(&self, hash: &str, remove_data: bool) -> Result<BaseResponse> {
        let action = if remove_data {
            "removedatatorrent"
        } else {
            "removetorrent"
        };
        info!("removing torrent {hash}, remove_data={remove_data}");
        self.hash_action(action, hash).await
    }

    pub async fn set_props(&self, hash: &str, props: &[(&str, &str)]) -> Result<BaseResponse> {
        let mut params = props
            .iter()
            .map(|(k, v)| (*k, v.to_string()))
            .collect::<Vec<_>>();
        params.push(("hash", hash.to_string()));
        self.request("setprops", params).await
    }

    /// `settings` are `(name, value)` pairs, sent as repeated `s` / `v`.
    pub async fn set_setting(&self, settings: &[(&str, &str)]) -> Result<BaseResponse> {
        let mut params = vec![];
        for (name, value) in settings {
            params.push(("s", name.to_string()));
            params.push(("v", value.to_string()));
        }
        self.request("setsetting", params).await
    }

    pub async fn rss_update(&self, feed: &RssFeedUpdate) -> Result<RssUpdateResponse> {
        self.request("rss-update", feed.params()).await
    }

    pub async fn rss_remove(&self, id: i64) -> Result<BaseResponse> {
        self.request("rss-remove", vec![("feedid", id.to_string())]).await
    }

    /// Add a torrent from a url, usually a magnet
    pub async fn add_torrent_from_url(&self, url: &str) -> Result<BaseResponse> {
        info!("adding torrent from url {url}");
        self.request("add-url", vec![("s", url.to_string())]).await
    }

    pub async fn add_torrent(&self, torrent: impl Into<TorrentFile>) -> Result<BaseResponse> {
        let bytes = torrent.into().into_bytes().await?;
        self.add_torrent_bytes(bytes).await
    }

    async fn add_torrent_bytes(&self, bytes: Vec<u8>) -> Result<BaseResponse> {
        use multipart::Part;
        let credentials = self.ensure_authenticated().await?;
        let part = Part::bytes(bytes)
            .file_name("file.torrent")
            .mime_str("application/x-bittorrent")?;
        let form = multipart::Form::new().part("torrent_file", part);

        let url = self.url("");
        let response = self
            .authorize(self.inner.post(&url), &credentials)
            .query(&[
                ("download_dir", "0"),
                ("path", ""),
                ("action", "add-file"),
                ("token", credentials.token.as_str()),
            ])
            .multipart(form)
            .send()
            .await?;
        let response = check_status("add-file", response)?;
        info!("add torrent success");
        Ok(response.json::<BaseResponse>().await?)
    }

    /// Adds the torrent, applies `options` and reads it back from the list.
    ///
    /// The hash is computed locally, so the torrent has to show up in the
    /// very next listing; there is no polling.
    pub async fn normalized_add_torrent(
        &self,
        torrent: impl Into<TorrentSource>,
        options: AddTorrentOptions,
    ) -> Result<NormalizedTorrent> {
        let hash = match torrent.into() {
            TorrentSource::Magnet(uri) => {
                let magnet = Magnet::parse(&uri)?;
                self.add_torrent_from_url(&uri).await?;
                magnet.info_hash
            }
            TorrentSource::File(file) => {
                let bytes = file.into_bytes().await?;
                let hash = torrent_meta::info_hash(&bytes)?;
                self.add_torrent_bytes(bytes).await?;
                hash
            }
        };

        if options.start_paused {
            self.pause_torrent(&hash).await?;
        }
        if let Some(label) = &options.label {
            self.set_props(&hash, &[("s", "label"), ("v", label.as_str())])
                .await?;
        }

        self.get_torrent(&hash).await
    }

    pub async fn list_torrents(&self) -> Result<TorrentListResponse> {
        self.request("", vec![("list", "1".to_string())]).await
    }

    pub async fn get_torrent(&self, id: &str) -> Result<NormalizedTorrent> {
        let list = self.list_torrents().await?;
        let torrent = list
            .torrents
            .iter()
            .find(|t| t.hash().eq_ignore_ascii_case(id))
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        Ok(normalize_torrent_data(torrent))
    }

    pub async fn get_all_data(&self) -> Result<AllClientData> {
        let list = self.list_torrents().await?;
        debug!(
            "listed {} torrents, {} labels",
            list.torrents.len(),
            list.label.len()
        );
        Ok(AllClientData::from_list(list))
    }
}

fn action_name(action: &str) -> &str {
    if action.is_empty() {
        "list"
    } else {
        action
    }
}

fn check_status(action: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        warn!("{action} failed, status: {status}");
        Err(Error::Status {
            action: action.to_string(),
            status,
        })
    }
}

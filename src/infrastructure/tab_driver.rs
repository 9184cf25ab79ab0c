//! 页面驱动器 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露 导航 / 等待加载 / 执行脚本 / 截图 的能力。
//! 不认识 ASN / 批次，不处理业务流程。
//!
//! 三种等待策略：
//! - `wait_for_load`：等待当前导航的 load 完成，带超时；
//! - `eval_navigation_script`：先订阅 load 完成事件再执行脚本，脚本触发
//!   新导航时等下一次 load 完成（边沿触发，不会把上一次导航的已加载
//!   状态误判为新页面已就绪）；
//! - `wait_for_quiet`：每收到一次加载事件就重开倒计时，倒计时安静走完
//!   才返回。这是对页面生命周期事件的防抖，不是真正的网络空闲探测。
//!
//! 能力通过 `Tab` / `TabOpener` 两个 trait 暴露，流程层只依赖 trait。

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::{
    CaptureScreenshotFormat, EventFrameStartedLoading, EventLoadEventFired,
};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, Page};
use futures::StreamExt;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, warn};

use crate::error::ProcessError;

/// 单个页面的能力
#[async_trait]
pub trait Tab: Send + Sync {
    /// 页面当前导航的 URL
    fn url(&self) -> &str;

    /// 等待当前导航的加载完成，超时视为处理失败
    async fn wait_for_load(&self) -> Result<(), ProcessError>;

    /// 等待页面"安静"：`quiet_window` 时长内没有新的加载事件即返回
    async fn wait_for_quiet(&self, quiet_window: Duration) -> Result<(), ProcessError>;

    /// 固定等待，容忍 load 事件之后的客户端渲染
    async fn settle(&self, delay: Duration);

    /// 执行一段可能触发导航的 JS 脚本并返回 JSON 结果
    ///
    /// 约定：脚本返回 `true` 表示已触发一次新导航，此时本方法会等到
    /// 该导航的 load 完成才返回；返回其它值时立即返回脚本结果。
    async fn eval_navigation_script(&self, js_code: String) -> Result<JsonValue, ProcessError>;

    /// 截取可见视口的 PNG 截图
    async fn screenshot(&self, label: &str) -> Result<Vec<u8>, ProcessError>;

    /// 关闭页面（消耗自身，保证关闭之后不再有任何操作）
    async fn close(self: Box<Self>);
}

/// 页面工厂：创建页面并发起导航
#[async_trait]
pub trait TabOpener: Send + Sync {
    async fn open(&self, url: &str) -> Result<Box<dyn Tab>, ProcessError>;
}

/// 基于真实浏览器的页面工厂
pub struct BrowserTabs {
    browser: Browser,
    load_timeout: Duration,
}

impl BrowserTabs {
    pub fn new(browser: Browser, load_timeout: Duration) -> Self {
        Self {
            browser,
            load_timeout,
        }
    }
}

#[async_trait]
impl TabOpener for BrowserTabs {
    async fn open(&self, url: &str) -> Result<Box<dyn Tab>, ProcessError> {
        let driver = TabDriver::open(&self.browser, url, self.load_timeout).await?;
        Ok(Box::new(driver))
    }
}

/// 页面驱动器
pub struct TabDriver {
    page: Page,
    url: String,
    load_timeout: Duration,
}

impl TabDriver {
    /// 创建新页面并发起导航（不等待加载完成）
    pub async fn open(
        browser: &Browser,
        url: &str,
        load_timeout: Duration,
    ) -> Result<Self, ProcessError> {
        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ProcessError::PageCreation { source: e })?;
        debug!("已创建页面，正在导航到: {}", url);

        page.goto(url).await.map_err(|e| ProcessError::Navigation {
            url: url.to_string(),
            source: e,
        })?;

        Ok(Self {
            page,
            url: url.to_string(),
            load_timeout,
        })
    }

    fn load_timeout_error(&self) -> ProcessError {
        ProcessError::LoadTimeout {
            url: self.url.clone(),
            waited_ms: self.load_timeout.as_millis() as u64,
        }
    }
}

#[async_trait]
impl Tab for TabDriver {
    fn url(&self) -> &str {
        &self.url
    }

    async fn wait_for_load(&self) -> Result<(), ProcessError> {
        match timeout(self.load_timeout, self.page.wait_for_navigation()).await {
            Ok(Ok(_)) => {
                debug!("页面加载完成: {}", self.url);
                Ok(())
            }
            Ok(Err(e)) => Err(ProcessError::Navigation {
                url: self.url.clone(),
                source: e,
            }),
            Err(_) => Err(self.load_timeout_error()),
        }
    }

    /// 每收到一次 frameStartedLoading 就重开倒计时；整体仍受
    /// `load_timeout` 约束，避免页面持续活跃时无限等待。
    async fn wait_for_quiet(&self, quiet_window: Duration) -> Result<(), ProcessError> {
        let mut loading_events = self
            .page
            .event_listener::<EventFrameStartedLoading>()
            .await
            .map_err(|e| ProcessError::Lifecycle { source: e })?;

        let deadline = Instant::now() + self.load_timeout;

        loop {
            let window = sleep(quiet_window);
            tokio::pin!(window);

            tokio::select! {
                _ = &mut window => {
                    debug!("页面已安静: {}", self.url);
                    return Ok(());
                }
                maybe_event = loading_events.next() => {
                    match maybe_event {
                        Some(_) => {
                            debug!("页面仍在加载，重开安静倒计时: {}", self.url);
                            if Instant::now() >= deadline {
                                return Err(self.load_timeout_error());
                            }
                        }
                        // 事件流结束说明页面已经没了
                        None => {
                            return Err(ProcessError::TabClosed {
                                label: self.url.clone(),
                            })
                        }
                    }
                }
            }
        }
    }

    async fn settle(&self, delay: Duration) {
        sleep(delay).await;
    }

    /// 订阅必须发生在脚本执行之前：当前帧此刻处于上一次导航的已加载
    /// 状态，若在脚本之后才去等加载，可能立即命中旧状态而提前返回。
    async fn eval_navigation_script(&self, js_code: String) -> Result<JsonValue, ProcessError> {
        let mut load_events = self
            .page
            .event_listener::<EventLoadEventFired>()
            .await
            .map_err(|e| ProcessError::Lifecycle { source: e })?;

        let result = self
            .page
            .evaluate(js_code)
            .await
            .map_err(|e| ProcessError::Script { source: e })?;
        let value: JsonValue = result
            .into_value()
            .map_err(|e| ProcessError::ScriptResult { source: e })?;

        // 脚本没有触发导航，不必等加载
        if value.as_bool() != Some(true) {
            return Ok(value);
        }

        match timeout(self.load_timeout, load_events.next()).await {
            Ok(Some(_)) => {
                debug!("脚本触发的导航已加载完成: {}", self.url);
                Ok(value)
            }
            Ok(None) => Err(ProcessError::TabClosed {
                label: self.url.clone(),
            }),
            Err(_) => Err(self.load_timeout_error()),
        }
    }

    async fn screenshot(&self, label: &str) -> Result<Vec<u8>, ProcessError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(false)
            .build();

        let data = self
            .page
            .screenshot(params)
            .await
            .map_err(|e| ProcessError::Capture {
                label: label.to_string(),
                source: e,
            })?;

        if data.is_empty() {
            return Err(ProcessError::EmptyCapture {
                label: label.to_string(),
            });
        }
        Ok(data)
    }

    /// 所有退出路径都要走到这里；关闭失败（页面可能已经没了）
    /// 只记日志，绝不让清理动作拖垮整个批次。
    async fn close(self: Box<Self>) {
        if let Err(e) = self.page.close().await {
            warn!("关闭页面失败 ({}): {}", self.url, e);
        }
    }
}

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// 测试内起一个真实监听端口的假上游，路由由测试自行定义。
pub struct FakeUpstream {
    pub base_url: String,
    handle: JoinHandle<()>,
}

impl FakeUpstream {
    pub async fn spawn(router: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake upstream");
        let addr = listener.local_addr().expect("fake upstream addr");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        Self {
            base_url: format!("http://{addr}"),
            handle,
        }
    }
}

impl Drop for FakeUpstream {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

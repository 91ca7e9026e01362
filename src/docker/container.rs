/// 시나리오 하나가 독점하는 컨테이너 정보
///
/// 생성 인자는 `docker run` 명령행과 같은 순서로 재구성됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle {
    pub name: String,
    pub image: String,
    /// `KEY=value` 형식의 환경 변수
    pub env: Vec<String>,
    /// 종료 시 자동 삭제 (`--rm`)
    pub auto_remove: bool,
    /// 컨테이너 기본 명령
    pub command: Vec<String>,
}

impl ContainerHandle {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            env: Vec::new(),
            auto_remove: false,
            command: vec!["sh".to_string()],
        }
    }

    pub fn with_env(mut self, entry: impl Into<String>) -> Self {
        self.env.push(entry.into());
        self
    }

    pub fn with_auto_remove(mut self, auto_remove: bool) -> Self {
        self.auto_remove = auto_remove;
        self
    }

    /// `docker run` 뒤에 붙는 인자 목록
    pub fn creation_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for entry in &self.env {
            args.push("-e".to_string());
            args.push(entry.clone());
        }
        if self.auto_remove {
            args.push("--rm".to_string());
        }
        args.extend([
            "-td".to_string(),
            "--name".to_string(),
            self.name.clone(),
            self.image.clone(),
        ]);
        args.extend(self.command.iter().cloned());
        args
    }
}

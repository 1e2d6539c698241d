//! 解析与计划入口
//!
//! 宿主以函数指针的形式持有解析钩子和计划钩子。解析钩子把文本解析为一条语句，
//! 计划钩子从会话状态中取回解析数据并交给分发器。

use log::{debug, warn};

use super::parse_data::{ParserExtensionParseData, PgqParseData};
use super::state::{get_pgq_state, ClientContext, PgqState};
use crate::config::Config;
use crate::core::{PgqError, PgqResult};
use crate::query::parser::{split_statements, Parser};
use crate::query::planner::PlanDirective;
use crate::query::rewrite::handle_statement;

/// 默认的会话状态键
pub const DEFAULT_STATE_KEY: &str = "duckpgq";

/// 交给两个钩子的扩展信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserExtensionInfo {
    pub max_recursion_depth: usize,
    pub state_key: String,
}

impl Default for ParserExtensionInfo {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ParserExtensionInfo {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_recursion_depth: config.parser.max_recursion_depth,
            state_key: config.extension.state_key.clone(),
        }
    }
}

pub type ParseFunction = fn(&ParserExtensionInfo, &str) -> PgqResult<Box<dyn ParserExtensionParseData>>;

pub type PlanFunction =
    fn(&ParserExtensionInfo, &mut ClientContext, Box<dyn ParserExtensionParseData>) -> PgqResult<PlanDirective>;

/// 注册到宿主配置中的解析扩展
#[derive(Debug, Clone)]
pub struct ParserExtension {
    pub parse_function: ParseFunction,
    pub plan_function: PlanFunction,
    pub info: ParserExtensionInfo,
}

impl ParserExtension {
    /// 对一条查询依次执行解析钩子与计划钩子
    pub fn parse_and_plan(&self, context: &mut ClientContext, query: &str) -> PgqResult<PlanDirective> {
        (self.parse_function)(&self.info, query)
            .and_then(|parse_data| (self.plan_function)(&self.info, context, parse_data))
            .map_err(|err| {
                warn!("会话 {} 的 PGQ 查询在 {} 阶段失败: {}", context.id(), err.phase(), err);
                err
            })
    }
}

/// 宿主数据库配置中与解析扩展有关的部分
#[derive(Debug, Clone, Default)]
pub struct DbConfig {
    pub parser_extensions: Vec<ParserExtension>,
}

pub struct PgqParserExtension;

impl PgqParserExtension {
    pub fn new(info: ParserExtensionInfo) -> ParserExtension {
        ParserExtension {
            parse_function: pgq_parse,
            plan_function: pgq_plan,
            info,
        }
    }

    /// 以默认配置注册
    pub fn register(config: &mut DbConfig) {
        Self::register_with_info(config, ParserExtensionInfo::default());
    }

    pub fn register_with_info(config: &mut DbConfig, info: ParserExtensionInfo) {
        debug!("注册 PGQ 解析扩展, 状态键 {}", info.state_key);
        config.parser_extensions.push(Self::new(info));
    }
}

/// 解析钩子
///
/// 去掉一个前导 `-`（宿主用它标记另一种分发方式），要求文本中恰好一条语句。
pub fn pgq_parse(info: &ParserExtensionInfo, query: &str) -> PgqResult<Box<dyn ParserExtensionParseData>> {
    let query = query.strip_prefix('-').unwrap_or(query);

    let statements = split_statements(query)?;
    if statements.len() != 1 {
        warn!("检测到 {} 条语句, 拒绝解析", statements.len());
        return Err(PgqError::MultipleStatements(statements.len()));
    }

    let statement = Parser::new(statements[0])
        .with_max_recursion_depth(info.max_recursion_depth)
        .parse_statement()?;
    debug!("解析得到 {} 语句", statement.kind());

    Ok(Box::new(PgqParseData::new(statement)))
}

/// 计划钩子
///
/// 整个重写在一次加锁内完成。
pub fn pgq_plan(
    info: &ParserExtensionInfo,
    context: &mut ClientContext,
    parse_data: Box<dyn ParserExtensionParseData>,
) -> PgqResult<PlanDirective> {
    debug!("会话 {} 进入计划钩子", context.id());
    let state = get_pgq_state(context, &info.state_key)?;
    let mut guard = state.lock();
    let PgqState {
        parse_data: current,
        correlation,
    } = &mut *guard;

    *current = Some(parse_data);
    let pgq_data = current
        .as_mut()
        .and_then(|data| data.as_any_mut().downcast_mut::<PgqParseData>())
        .ok_or(PgqError::MissingParseData)?;

    handle_statement(&mut pgq_data.statement, correlation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::state::register_pgq_state;
    use std::any::Any;

    #[derive(Debug, Clone)]
    struct ForeignParseData;

    impl ParserExtensionParseData for ForeignParseData {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn copy(&self) -> Box<dyn ParserExtensionParseData> {
            Box::new(self.clone())
        }

        fn to_string(&self) -> String {
            "foreign".to_string()
        }
    }

    fn parsed(query: &str) -> PgqParseData {
        let data = pgq_parse(&ParserExtensionInfo::default(), query).expect("解析应该成功");
        data.as_any()
            .downcast_ref::<PgqParseData>()
            .cloned()
            .expect("应为 PGQ 解析数据")
    }

    #[test]
    fn test_leading_dash_is_stripped() {
        assert_eq!(parsed("-pragma foo"), parsed("pragma foo"));
    }

    #[test]
    fn test_only_one_dash_is_stripped() {
        let result = pgq_parse(&ParserExtensionInfo::default(), "--pragma foo");
        assert!(matches!(result, Err(PgqError::Parse(_))));
    }

    #[test]
    fn test_multiple_statements_rejected() {
        let result = pgq_parse(&ParserExtensionInfo::default(), "a; b");
        assert_eq!(result.unwrap_err(), PgqError::MultipleStatements(2));
    }

    #[test]
    fn test_grammar_error_is_parse_error() {
        let result = pgq_parse(&ParserExtensionInfo::default(), "SELECT FROM");
        assert!(matches!(result, Err(PgqError::Parse(_))));
    }

    #[test]
    fn test_plan_requires_registered_state() {
        let info = ParserExtensionInfo::default();
        let mut context = ClientContext::new(7);
        let data = pgq_parse(&info, "DROP PROPERTY GRAPH g").expect("解析应该成功");
        let err = pgq_plan(&info, &mut context, data).unwrap_err();
        assert_eq!(err, PgqError::MissingSessionState(DEFAULT_STATE_KEY.to_string()));
    }

    #[test]
    fn test_plan_with_foreign_parse_data() {
        let info = ParserExtensionInfo::default();
        let mut context = ClientContext::new(7);
        let state = register_pgq_state(&context, &info.state_key);

        let err = pgq_plan(&info, &mut context, Box::new(ForeignParseData)).unwrap_err();
        assert_eq!(err, PgqError::MissingParseData);
        // 外来的解析数据仍被安装为当前解析数据
        assert!(state.lock().parse_data.is_some());
    }

    #[test]
    fn test_plan_installs_parse_data() {
        let info = ParserExtensionInfo::default();
        let mut context = ClientContext::new(7);
        let state = register_pgq_state(&context, &info.state_key);

        let data = pgq_parse(&info, "SUMMARIZE PROPERTY GRAPH g").expect("解析应该成功");
        let directive = pgq_plan(&info, &mut context, data).expect("计划应该成功");
        assert_eq!(directive.function_name(), Some("summarize_property_graph"));

        let guard = state.lock();
        let installed = guard
            .parse_data
            .as_ref()
            .and_then(|data| data.as_any().downcast_ref::<PgqParseData>())
            .expect("解析数据应已安装");
        assert_eq!(installed.statement.kind(), "SELECT");
    }

    #[test]
    fn test_register_pushes_extension() {
        let mut config = DbConfig::default();
        PgqParserExtension::register(&mut config);
        assert_eq!(config.parser_extensions.len(), 1);
        assert_eq!(config.parser_extensions[0].info.state_key, DEFAULT_STATE_KEY);

        let mut context = ClientContext::new(1);
        register_pgq_state(&context, DEFAULT_STATE_KEY);
        let directive = config.parser_extensions[0]
            .parse_and_plan(&mut context, "-CREATE PROPERTY GRAPH g VERTEX TABLES (v)")
            .expect("应该成功");
        assert_eq!(directive.function_name(), Some("create_property_graph"));
    }
}

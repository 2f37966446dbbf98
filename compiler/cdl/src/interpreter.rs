//! Function and modifier registries, instruction building and the
//! execution entry points.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use cdl_eval::ValueInfo;
use cdl_ir::Node;
use cdl_lexer::Lexer;
use cdl_parse::Parser;
use rustc_hash::FxHashMap;

use crate::binding::{pop_as, FromValue, IntoReturn};
use crate::error::{insufficient_arguments, undefined_function, undefined_modifier, Error, Result};
use crate::function::{ContextFn, ConvertedFunction, NativeFn, StandardFunction};
use crate::print_handler::{PrintHandler, SharedPrintHandler};
use crate::{Context, Function, Instruction, Modifier, ValueNegator};

/// Name of the predefined function that prints its argument.
pub const PRINT: &str = "Print";
/// Name of the predefined function that returns its argument.
pub const EVALUATE: &str = "Evaluate";

/// Instructions kept by [`Interpreter::execute`] unless configured otherwise.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Configuration for an [`Interpreter`].
#[derive(Debug)]
pub struct InterpreterBuilder {
    optimize_on_build: bool,
    cache_capacity: usize,
    print_handler: SharedPrintHandler,
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        InterpreterBuilder {
            optimize_on_build: true,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            print_handler: PrintHandler::stdout(),
        }
    }
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constant-fold instructions as they are built. On by default.
    #[must_use]
    pub fn optimize_on_build(mut self, enabled: bool) -> Self {
        self.optimize_on_build = enabled;
        self
    }

    /// Keep built instructions keyed by source text for
    /// [`Interpreter::execute`]. On by default.
    #[must_use]
    pub fn cache(mut self, enabled: bool) -> Self {
        self.cache_capacity = if enabled { DEFAULT_CACHE_CAPACITY } else { 0 };
        self
    }

    /// Most instructions the cache holds. When full, the oldest entry is
    /// evicted first. Zero disables caching.
    #[must_use]
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// Destination of `Print`. Stdout by default.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = handler;
        self
    }

    /// Creates the interpreter with `Print`, `Evaluate` and the `neg`
    /// modifier registered.
    pub fn build<C: Context>(self) -> Interpreter<C> {
        let mut interpreter = Interpreter {
            functions: FxHashMap::default(),
            modifiers: FxHashMap::default(),
            cache: FxHashMap::default(),
            cache_order: VecDeque::new(),
            lexer: Lexer::new(),
            parser: Parser::new(),
            optimize_on_build: self.optimize_on_build,
            cache_capacity: self.cache_capacity,
            print_handler: self.print_handler,
        };
        interpreter.register_builtins();
        interpreter
    }
}

/// Parses instruction text against the registered functions and modifiers
/// and runs the result against a host [`Context`].
pub struct Interpreter<C: Context> {
    functions: FxHashMap<Arc<str>, Arc<dyn Function<C>>>,
    modifiers: FxHashMap<Arc<str>, Arc<dyn Modifier<C>>>,
    cache: FxHashMap<Arc<str>, Arc<Instruction<C>>>,
    /// Insertion order of `cache` keys, oldest first.
    cache_order: VecDeque<Arc<str>>,
    lexer: Lexer,
    parser: Parser,
    optimize_on_build: bool,
    cache_capacity: usize,
    print_handler: SharedPrintHandler,
}

impl<C: Context> Default for Interpreter<C> {
    fn default() -> Self {
        InterpreterBuilder::default().build()
    }
}

impl<C: Context> Interpreter<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    fn register_builtins(&mut self) {
        let printer = Arc::clone(&self.print_handler);
        self.register_standard_function(PRINT, move |ctx: &mut C, args: &[Node]| {
            let arg = args.first().ok_or_else(|| insufficient_arguments(PRINT, 1, 0))?;
            let text = ctx.evaluator().eval_string(arg)?;
            printer.println(&text);
            Ok(ValueInfo::VOID)
        });
        self.register_standard_function(EVALUATE, |ctx: &mut C, args: &[Node]| {
            let arg = args.first().ok_or_else(|| insufficient_arguments(EVALUATE, 1, 0))?;
            Ok(ctx.evaluator().eval(arg)?)
        });
        self.register_return_modifier(ValueNegator);
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print_handler
    }

    // Registration

    /// Registers `function` under its own name, replacing any function of
    /// that name. Returns `true` if one was replaced.
    pub fn register_function<F: Function<C> + 'static>(&mut self, function: F) -> bool {
        self.insert_function(Arc::new(function))
    }

    fn insert_function(&mut self, function: Arc<dyn Function<C>>) -> bool {
        let name = Arc::<str>::from(function.name());
        let replaced = self.functions.insert(Arc::clone(&name), function).is_some();
        if replaced {
            tracing::debug!(%name, "replaced function");
        }
        self.clear_cache();
        replaced
    }

    pub fn register_standard_function<F>(&mut self, name: impl Into<Arc<str>>, body: F) -> bool
    where
        F: Fn(&mut C, &[Node]) -> Result<ValueInfo> + Send + Sync + 'static,
    {
        self.register_function(StandardFunction::new(name, body))
    }

    /// Registers a plain Rust function; see [`ConvertedFunction`].
    pub fn register_native_function<Args, R, F>(&mut self, name: impl Into<Arc<str>>, native: F) -> bool
    where
        Args: 'static,
        R: IntoReturn,
        F: NativeFn<Args, R>,
    {
        self.register_function(ConvertedFunction::new(name, native))
    }

    /// Registers a Rust function whose first parameter is the context.
    pub fn register_native_function_with_context<Args, R, F>(
        &mut self,
        name: impl Into<Arc<str>>,
        native: F,
    ) -> bool
    where
        Args: 'static,
        R: IntoReturn,
        F: ContextFn<C, Args, R>,
    {
        self.register_function(ConvertedFunction::with_context(name, native))
    }

    pub fn unregister_function(&mut self, name: &str) -> bool {
        let removed = self.functions.remove(name).is_some();
        if removed {
            self.clear_cache();
        }
        removed
    }

    pub fn function(&self, name: &str) -> Option<&Arc<dyn Function<C>>> {
        self.functions.get(name)
    }

    /// Registers `modifier` under its own name, replacing any modifier of
    /// that name. Returns `true` if one was replaced.
    pub fn register_return_modifier<M: Modifier<C> + 'static>(&mut self, modifier: M) -> bool {
        let name = Arc::<str>::from(modifier.name());
        let replaced = self
            .modifiers
            .insert(Arc::clone(&name), Arc::new(modifier))
            .is_some();
        if replaced {
            tracing::debug!(%name, "replaced return modifier");
        }
        self.clear_cache();
        replaced
    }

    pub fn unregister_return_modifier(&mut self, name: &str) -> bool {
        let removed = self.modifiers.remove(name).is_some();
        if removed {
            self.clear_cache();
        }
        removed
    }

    fn lookup_function(&self, name: &str) -> Result<Arc<dyn Function<C>>> {
        self.functions
            .get(name)
            .cloned()
            .ok_or_else(|| undefined_function(name).into())
    }

    fn lookup_modifier(&self, name: &str) -> Result<Arc<dyn Modifier<C>>> {
        self.modifiers
            .get(name)
            .cloned()
            .ok_or_else(|| undefined_modifier(name).into())
    }

    // Building

    /// Parses `Function: arg, ... -> modifier, ...` into an instruction.
    #[tracing::instrument(level = "debug", skip(self, ctx))]
    pub fn build_instruction(&mut self, ctx: &mut C, text: &str) -> Result<Instruction<C>> {
        let tokens = self.lexer.tokenize(text)?;
        let parsed = self.parser.parse_instruction(tokens)?;
        let function = self.lookup_function(&parsed.function)?;
        let modifiers = parsed
            .modifiers
            .iter()
            .map(|name| self.lookup_modifier(name))
            .collect::<Result<Vec<_>>>()?;
        self.finish(ctx, Arc::from(text), function, parsed.parameters, modifiers)
    }

    /// Builds from pre-split parts: a function name, the parameter list text
    /// and comma separated modifier names.
    #[tracing::instrument(level = "debug", skip(self, ctx))]
    pub fn build_instruction_parts(
        &mut self,
        ctx: &mut C,
        function: &str,
        parameters: &str,
        modifiers: &str,
    ) -> Result<Instruction<C>> {
        let function_ref = self.lookup_function(function)?;
        let tokens = self.lexer.tokenize(parameters)?;
        let params = self.parser.parse_parameter_list(tokens)?;
        let names: Vec<&str> = modifiers
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .collect();
        let modifier_refs = names
            .iter()
            .map(|name| self.lookup_modifier(name))
            .collect::<Result<Vec<_>>>()?;

        let mut source = format!("{function}: {parameters}");
        if !names.is_empty() {
            source.push_str(" -> ");
            source.push_str(&names.join(", "));
        }
        self.finish(ctx, Arc::from(source), function_ref, params, modifier_refs)
    }

    /// Builds from a function name and one expression text per parameter.
    #[tracing::instrument(level = "debug", skip(self, ctx))]
    pub fn build_instruction_from_parameters(
        &mut self,
        ctx: &mut C,
        function: &str,
        parameters: &[&str],
    ) -> Result<Instruction<C>> {
        let function_ref = self.lookup_function(function)?;
        let mut params = Vec::with_capacity(parameters.len());
        for text in parameters {
            let tokens = self.lexer.tokenize(text)?;
            params.push(self.parser.parse_single_expression(tokens)?);
        }
        let source = format!("{function}: {}", parameters.join(", "));
        self.finish(ctx, Arc::from(source), function_ref, params, Vec::new())
    }

    fn finish(
        &self,
        ctx: &mut C,
        source: Arc<str>,
        function: Arc<dyn Function<C>>,
        parameters: Vec<Node>,
        modifiers: Vec<Arc<dyn Modifier<C>>>,
    ) -> Result<Instruction<C>> {
        let mut instruction = Instruction::new(source, function, parameters, modifiers);
        if self.optimize_on_build {
            instruction.optimize(ctx)?;
        }
        Ok(instruction)
    }

    // Execution

    fn cached_instruction(&mut self, ctx: &mut C, text: &str) -> Result<Arc<Instruction<C>>> {
        if let Some(instruction) = self.cache.get(text) {
            return Ok(Arc::clone(instruction));
        }
        let instruction = Arc::new(self.build_instruction(ctx, text)?);
        if self.cache_capacity > 0 {
            self.cache_instruction(Arc::clone(&instruction));
        }
        Ok(instruction)
    }

    fn cache_instruction(&mut self, instruction: Arc<Instruction<C>>) {
        while self.cache.len() >= self.cache_capacity {
            if let Some(oldest) = self.cache_order.pop_front() {
                self.cache.remove(&oldest);
            } else {
                self.cache.clear();
                break;
            }
        }
        let key = Arc::clone(instruction.source_arc());
        self.cache_order.push_back(Arc::clone(&key));
        self.cache.insert(key, instruction);
    }

    /// Builds (or reuses) the instruction for `text` and executes it. The
    /// result is left on the stack.
    pub fn execute(&mut self, ctx: &mut C, text: &str) -> Result<ValueInfo> {
        self.cached_instruction(ctx, text)?.execute(ctx)
    }

    /// Like [`execute`](Self::execute), popping the result as a `T`.
    pub fn execute_as<T: FromValue>(&mut self, ctx: &mut C, text: &str) -> Result<T> {
        self.cached_instruction(ctx, text)?.execute_as(ctx)
    }

    /// Evaluates a single expression, without a function, and pops the
    /// result as a `T`. Nothing is cached or optimized.
    pub fn evaluate_expression<T: FromValue>(&mut self, ctx: &mut C, text: &str) -> Result<T> {
        let tokens = self.lexer.tokenize(text)?;
        let node = self.parser.parse_single_expression(tokens)?;

        let evaluator = ctx.evaluator();
        let mark = evaluator.stack().mark();
        let result = evaluator
            .eval(&node)
            .map_err(Error::from)
            .and_then(|info| pop_as(evaluator, info));
        if result.is_err() {
            evaluator.stack_mut().reset_to(mark);
        }
        result
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.cache_order.clear();
    }

    pub fn cached_instruction_count(&self) -> usize {
        self.cache.len()
    }

    pub fn is_cached(&self, text: &str) -> bool {
        self.cache.contains_key(text)
    }
}

impl<C: Context> fmt::Debug for Interpreter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut functions: Vec<&str> = self.functions.keys().map(AsRef::as_ref).collect();
        functions.sort_unstable();
        let mut modifiers: Vec<&str> = self.modifiers.keys().map(AsRef::as_ref).collect();
        modifiers.sort_unstable();
        f.debug_struct("Interpreter")
            .field("functions", &functions)
            .field("modifiers", &modifiers)
            .field("cached", &self.cache.len())
            .field("optimize_on_build", &self.optimize_on_build)
            .field("cache_capacity", &self.cache_capacity)
            .field("print_handler", &self.print_handler)
            .finish_non_exhaustive()
    }
}

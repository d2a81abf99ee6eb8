//! PHP reserved words, built-ins and their token classes
//!
//! Groups are inserted in order and a later group overrides an earlier one for
//! the same word. `return` is both a `keyword c` and a language construct; the
//! language-construct entry wins, so the parser treats `return` like a
//! function-style name.

use std::collections::HashMap;
use std::sync::OnceLock;

type WordClass = (&'static str, &'static str);

const GROUPS: &[(&[&str], &str, &str)] = &[
    (&["if", "elseif", "while", "declare"], "keyword a", "php-keyword"),
    (&["do", "else", "try"], "keyword b", "php-keyword"),
    (
        &["return", "break", "continue", "new", "clone", "throw"],
        "keyword c",
        "php-keyword",
    ),
    (
        &["__CLASS__", "__DIR__", "__FILE__", "__FUNCTION__", "__METHOD__", "__NAMESPACE__"],
        "atom",
        "php-compile-time-constant",
    ),
    (&["true", "false", "null"], "atom", "php-atom"),
    (&["and", "or", "xor", "instanceof"], "operator", "php-keyword php-operator"),
    (&["class", "interface"], "class", "php-keyword"),
    (&["namespace", "use", "extends", "implements"], "namespace", "php-keyword"),
    (
        &[
            "die", "echo", "empty", "exit", "eval", "include", "include_once", "isset", "list",
            "require", "require_once", "return", "print", "unset", "array",
        ],
        "t_string",
        "php-reserved-language-construct",
    ),
    (&["switch"], "switch", "php-keyword"),
    (&["case"], "case", "php-keyword"),
    (&["default"], "default", "php-keyword"),
    (&["catch"], "catch", "php-keyword"),
    (&["function"], "function", "php-keyword"),
    // alternative syntax closers, followed by ':' like `default`
    (
        &["endif", "endwhile", "endfor", "endforeach", "endswitch", "enddeclare"],
        "default",
        "php-keyword",
    ),
    (&["const"], "const", "php-keyword"),
    (
        &["abstract", "final", "private", "protected", "public", "global", "static"],
        "modifier",
        "php-keyword",
    ),
    (&["var"], "modifier", "php-keyword deprecated"),
    (&["foreach"], "foreach", "php-keyword"),
    (&["as"], "as", "php-keyword"),
    (&["for"], "for", "php-keyword"),
    (
        &[
            "zend_version", "func_num_args", "func_get_arg", "func_get_args", "strlen", "strcmp",
            "strncmp", "strcasecmp", "strncasecmp", "each", "error_reporting", "define", "defined",
            "get_class", "get_parent_class", "method_exists", "property_exists", "class_exists",
            "interface_exists", "function_exists", "get_included_files", "get_required_files",
            "is_subclass_of", "is_a", "get_class_vars", "get_object_vars", "get_class_methods",
            "trigger_error", "user_error", "set_error_handler", "restore_error_handler",
            "set_exception_handler", "restore_exception_handler", "get_declared_classes",
            "get_declared_interfaces", "get_defined_functions", "get_defined_vars",
            "create_function", "get_resource_type", "get_loaded_extensions", "pdo_drivers",
            "socket_select", "socket_create", "socket_accept", "socket_listen", "socket_close",
            "socket_write", "socket_read", "socket_connect", "socket_bind", "socket_recv",
            "socket_send", "socket_strerror", "socket_last_error", "xdebug_var_dump",
            "xdebug_break", "xdebug_memory_usage", "_",
        ],
        "t_string",
        "php-predefined-function",
    ),
    (
        &[
            "E_ERROR", "E_RECOVERABLE_ERROR", "E_WARNING", "E_PARSE", "E_NOTICE", "E_STRICT",
            "E_CORE_ERROR", "E_CORE_WARNING", "E_COMPILE_ERROR", "PHP_NORMAL_READ",
            "PHP_BINARY_READ", "SOCKET_EINTR", "SOCKET_EBADF", "SOCKET_EACCES", "SOCKET_EINVAL",
            "SOCKET_EWOULDBLOCK", "SOCKET_EINPROGRESS", "SOCKET_ECONNRESET", "SOCKET_ETIMEDOUT",
            "SOCKET_ECONNREFUSED", "SOL_TCP", "SOL_UDP", "STDIN", "STDOUT", "STDERR",
        ],
        "atom",
        "php-predefined-constant",
    ),
    (
        &[
            "stdClass", "Exception", "ErrorException", "Reflection", "ReflectionException",
            "ReflectionFunction", "ReflectionParameter", "ReflectionMethod", "ReflectionClass",
            "ReflectionObject", "ReflectionProperty", "DateTime", "DateTimeZone", "Directory",
            "SimpleXMLElement", "DOMException", "DOMNode", "DOMDocument", "DOMElement", "DOMText",
            "DOMXPath", "RecursiveIteratorIterator", "IteratorIterator", "FilterIterator",
            "LimitIterator", "CachingIterator", "AppendIterator", "RegexIterator", "EmptyIterator",
            "ArrayObject", "ArrayIterator", "RecursiveArrayIterator", "SplFileInfo",
            "DirectoryIterator", "SplFileObject", "SplObjectStorage", "LogicException",
            "BadFunctionCallException", "BadMethodCallException", "DomainException",
            "InvalidArgumentException", "LengthException", "OutOfRangeException",
            "RuntimeException", "OutOfBoundsException", "OverflowException", "RangeException",
            "UnderflowException", "UnexpectedValueException", "XMLReader", "XMLWriter", "mysqli",
            "mysqli_result", "mysqli_stmt", "PDOException", "PDO", "PDOStatement", "PDORow",
        ],
        "t_string",
        "php-predefined-class",
    ),
];

static WORDS: OnceLock<HashMap<&'static str, WordClass>> = OnceLock::new();

fn words() -> &'static HashMap<&'static str, WordClass> {
    WORDS.get_or_init(|| {
        let mut table = HashMap::new();
        for (names, kind, style) in GROUPS {
            for name in *names {
                table.insert(*name, (*kind, *style));
            }
        }
        table
    })
}

/// Type tag and style of a known word; case-sensitive like the tokenizer
pub fn lookup(word: &str) -> Option<WordClass> {
    words().get(word).copied()
}

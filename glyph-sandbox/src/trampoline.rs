//! The trampoline (§4.7 ADDED): a small Python script spawned as the
//! sandbox child. It reads `{options, code}` as JSON from stdin, installs
//! the forwarded capability tokens, `exec`s the generated module body, and
//! writes an `ExecutionResult`-shaped JSON object to stdout. This is the
//! entire contents of the child's address space — everything resource
//! limiting and capability forwarding needs is decided before this script
//! ever runs (§4.7's "child process or equivalent isolate").

/// Embedded verbatim; the parent never edits this text, only the JSON it
/// feeds to the child's stdin changes between runs.
pub const TRAMPOLINE_SCRIPT: &str = r#"
import io
import json
import sys
import time
import traceback


def _read_request():
    raw = sys.stdin.read()
    return json.loads(raw)


def _install_tokens(tokens):
    import glyph_bridge.runtime as _ml_runtime
    for token in tokens:
        _ml_runtime.install_external_token(
            token["type"], token["patterns"], token["ops"], token.get("description", "")
        )


def main():
    request = _read_request()
    code = request["code"]
    tokens = request.get("tokens", [])

    _install_tokens(tokens)

    stdout_buf = io.StringIO()
    stderr_buf = io.StringIO()
    status = "ok"
    return_value = None

    start = time.monotonic()
    real_stdout, real_stderr = sys.stdout, sys.stderr
    sys.stdout, sys.stderr = stdout_buf, stderr_buf
    try:
        module_globals = {"__name__": "__ml_generated__"}
        exec(compile(code, "<ml-generated>", "exec"), module_globals)
        return_value = module_globals.get("__ml_result__")
    except MemoryError:
        status = "memory_exceeded"
    except Exception:
        status = "error"
        traceback.print_exc(file=stderr_buf)
    finally:
        sys.stdout, sys.stderr = real_stdout, real_stderr

    duration_ms = int((time.monotonic() - start) * 1000)

    result = {
        "status": status,
        "stdout": stdout_buf.getvalue(),
        "stderr": stderr_buf.getvalue(),
        "return_value": return_value,
        "duration_ms": duration_ms,
        "peak_memory_bytes": 0,
        "issues": [],
    }
    sys.stdout.write(json.dumps(result))
    sys.stdout.flush()


if __name__ == "__main__":
    main()
"#;
